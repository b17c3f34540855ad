//! Lookup answered from libphonenumber metadata.
//!
//! Knows validity, calling code and the line type the numbering plan assigns
//! to a range. Carrier names are never known, and numbers ported between
//! line types are reported by their original range.

use async_trait::async_trait;
use phonenumber::Type;

use pv_core::domain::entities::LineType;
use pv_core::services::phone::{LookupResult, PhoneLookupTrait};

#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineLookup;

impl OfflineLookup {
    pub fn new() -> Self {
        Self
    }

    pub fn resolve(&self, phone: &str) -> Result<LookupResult, String> {
        let parsed = phonenumber::parse(None, phone).map_err(|e| e.to_string())?;
        let valid = phonenumber::is_valid(&parsed);
        let line_type = if valid {
            line_type_for(parsed.number_type(&phonenumber::metadata::DATABASE))
        } else {
            LineType::Unknown
        };

        Ok(LookupResult {
            valid,
            carrier: None,
            line_type,
            country_code: Some(parsed.code().value().to_string()),
            carrier_error: false,
        })
    }
}

fn line_type_for(number_type: Type) -> LineType {
    match number_type {
        Type::Mobile | Type::Pager => LineType::Mobile,
        Type::FixedLine | Type::FixedLineOrMobile => LineType::Landline,
        Type::Voip | Type::PersonalNumber => LineType::Voip,
        _ => LineType::Unknown,
    }
}

#[async_trait]
impl PhoneLookupTrait for OfflineLookup {
    async fn lookup(&self, phone: &str) -> Result<LookupResult, String> {
        self.resolve(phone)
    }
}
