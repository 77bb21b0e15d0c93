// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Sets both GP8413 outputs to a fixed voltage and exits.

use anyhow::{Context, Result};
use clap::Parser;
use gp8413_light::config::parse_address;
use gp8413_light::hardware::{ChannelWriter, Gp8413, open_bus, volts_to_code};
use gp8413_light::types::VoltageRange;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about = "Set a GP8413 DAC output voltage")]
struct Params {
    /// Output voltage, clamped to the selected range
    #[arg(long, allow_negative_numbers = true, default_value_t = 2.0)]
    voltage: f32,
    /// Output span: 0-5V or 0-10V
    #[arg(long, env = "GP8413_RANGE", default_value = "0-10V")]
    range: VoltageRange,
    /// BCM number of the SDA pin
    #[arg(long, env = "GP8413_SDA_PIN", default_value_t = 2)]
    sda_pin: u8,
    /// BCM number of the SCL pin
    #[arg(long, env = "GP8413_SCL_PIN", default_value_t = 3)]
    scl_pin: u8,
    /// I2C address, decimal or 0x-prefixed hex
    #[arg(long, env = "GP8413_ADDRESS", default_value = "0x58", value_parser = parse_address)]
    address: u8,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let params = Params::parse();
    let volts = params.voltage.clamp(0.0, params.range.max_volts());
    if (volts - params.voltage).abs() > f32::EPSILON {
        tracing::warn!(requested = params.voltage, volts, "Voltage clamped to range");
    }

    let mut dac = Gp8413::new(
        open_bus(params.sda_pin, params.scl_pin)?,
        params.address,
        params.range,
    );
    dac.begin()
        .with_context(|| format!("GP8413 not found at {:#04x}", params.address))?;
    dac.write_both(volts).context("failed to write DAC outputs")?;

    println!(
        "{volts:.3} V ({}) -> code {:#06x}",
        params.range,
        volts_to_code(volts, params.range)
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_two_volts_at_factory_address() {
        let params = Params::parse_from(["gp8413-set"]);
        assert_eq!(params.voltage, 2.0);
        assert_eq!(params.address, 0x58);
        assert_eq!(params.range, VoltageRange::High);
    }

    #[test]
    fn address_accepts_hex() {
        let params = Params::parse_from(["gp8413-set", "--voltage", "2", "--address", "0x58"]);
        assert_eq!(params.address, 0x58);
        let params = Params::parse_from(["gp8413-set", "--address", "0X59"]);
        assert_eq!(params.address, 0x59);
    }

    #[test]
    fn address_outside_the_usable_range_is_rejected() {
        assert!(Params::try_parse_from(["gp8413-set", "--address", "0x07"]).is_err());
    }

    #[test]
    fn negative_voltage_is_accepted_for_clamping() {
        let params = Params::parse_from(["gp8413-set", "--voltage", "-1.5", "--range", "0-5V"]);
        assert_eq!(params.voltage, -1.5);
        assert_eq!(params.range, VoltageRange::Low);
    }
}
