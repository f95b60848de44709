// Fotowiderstand am ADC1 (Oneshot-Messung)

use esp_hal::Blocking;
use esp_hal::analog::adc::{Adc, AdcConfig, AdcPin, Attenuation};
use esp_hal::peripherals::{ADC1, GPIO1};
use feeder_core::{LightSensor, SensorError};

pub struct AdcLightSensor<'d> {
    adc: Adc<'d, ADC1<'d>, Blocking>,
    pin: AdcPin<GPIO1<'d>, ADC1<'d>>,
}

impl<'d> AdcLightSensor<'d> {
    /// 11 dB Dämpfung: Messbereich bis ~3.1 V
    pub fn new(adc1: ADC1<'d>, pin: GPIO1<'d>) -> Self {
        let mut config = AdcConfig::new();
        let pin = config.enable_pin(pin, Attenuation::_11dB);
        let adc = Adc::new(adc1, config);
        Self { adc, pin }
    }
}

impl<'d> LightSensor for AdcLightSensor<'d> {
    fn read(&mut self) -> Result<u16, SensorError> {
        nb::block!(self.adc.read_oneshot(&mut self.pin)).map_err(|_| SensorError::ReadFailed)
    }
}
