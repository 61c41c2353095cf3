// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Session configuration.
//!
//! Defaults reproduce the behavior of the bill editor: 7.5% tax adjusted in
//! half-point steps, 20% tip adjusted in whole points, both capped at 50%.
//! Every field may be overridden from TOML; decimals are written as strings
//! so they keep their exact value.
//!
//! ```
//! use bill_split::SplitConfig;
//! use rust_decimal_macros::dec;
//!
//! let config = SplitConfig::from_toml_str(r#"tip_rate = "18""#).unwrap();
//! assert_eq!(config.tip_rate, dec!(18));
//! assert_eq!(config.tax_rate, dec!(7.5));
//! ```

use crate::error::SplitError;
use crate::strategy::TaxTipPolicy;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SplitConfig {
    /// Initial subtotal text for even-split mode.
    pub subtotal: String,
    /// Initial tax rate, in percent.
    pub tax_rate: Decimal,
    /// Initial tip rate, in percent.
    pub tip_rate: Decimal,
    pub tax_step: Decimal,
    pub tip_step: Decimal,
    /// Upper bound for both tax and tip rates.
    pub max_rate: Decimal,
    /// Points moved by one percentage nudge.
    pub percentage_step: Decimal,
    /// How itemized splits treat tax and tip.
    pub itemized_tax_tip: TaxTipPolicy,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            subtotal: "0.00".to_owned(),
            tax_rate: dec!(7.5),
            tip_rate: dec!(20),
            tax_step: dec!(0.5),
            tip_step: dec!(1),
            max_rate: dec!(50),
            percentage_step: dec!(1),
            itemized_tax_tip: TaxTipPolicy::Exclude,
        }
    }
}

impl SplitConfig {
    /// Parses a TOML document. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`SplitError::InvalidConfig`] for malformed TOML, unknown
    /// fields, or negative rates and steps.
    pub fn from_toml_str(text: &str) -> Result<Self, SplitError> {
        let config: SplitConfig =
            toml::from_str(text).map_err(|e| SplitError::InvalidConfig(e.message().to_owned()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`SplitError::InvalidConfig`] when the file cannot be read or
    /// does not parse.
    pub fn load(path: &Path) -> Result<Self, SplitError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| SplitError::InvalidConfig(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&text)
    }

    fn validate(&self) -> Result<(), SplitError> {
        let fields = [
            ("tax_rate", self.tax_rate),
            ("tip_rate", self.tip_rate),
            ("tax_step", self.tax_step),
            ("tip_step", self.tip_step),
            ("max_rate", self.max_rate),
            ("percentage_step", self.percentage_step),
        ];
        for (name, value) in fields {
            if value.is_sign_negative() && !value.is_zero() {
                return Err(SplitError::InvalidConfig(format!(
                    "{name} must not be negative"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_editor() {
        let config = SplitConfig::default();
        assert_eq!(config.tax_rate, dec!(7.5));
        assert_eq!(config.tip_rate, dec!(20));
        assert_eq!(config.tax_step, dec!(0.5));
        assert_eq!(config.tip_step, dec!(1));
        assert_eq!(config.max_rate, dec!(50));
        assert_eq!(config.itemized_tax_tip, TaxTipPolicy::Exclude);
    }

    #[test]
    fn empty_document_is_default() {
        assert_eq!(SplitConfig::from_toml_str("").unwrap(), SplitConfig::default());
    }

    #[test]
    fn overrides_selected_fields() {
        let config = SplitConfig::from_toml_str(
            r#"
            subtotal = "78.00"
            tax_step = "0.25"
            itemized_tax_tip = "proportional"
            "#,
        )
        .unwrap();
        assert_eq!(config.subtotal, "78.00");
        assert_eq!(config.tax_step, dec!(0.25));
        assert_eq!(config.itemized_tax_tip, TaxTipPolicy::Proportional);
        assert_eq!(config.tip_step, dec!(1));
    }

    #[test]
    fn rejects_unknown_fields() {
        let result = SplitConfig::from_toml_str(r#"currency = "EUR""#);
        assert!(matches!(result, Err(SplitError::InvalidConfig(_))));
    }

    #[test]
    fn rejects_negative_steps() {
        let result = SplitConfig::from_toml_str(r#"tip_step = "-1""#);
        assert_eq!(
            result,
            Err(SplitError::InvalidConfig("tip_step must not be negative".into()))
        );
    }

    #[test]
    fn load_missing_file_fails() {
        let result = SplitConfig::load(Path::new("/nonexistent/bill-split.toml"));
        assert!(matches!(result, Err(SplitError::InvalidConfig(_))));
    }
}
