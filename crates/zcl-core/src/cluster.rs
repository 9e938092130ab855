//! ZCL cluster and attribute identifiers

/// Cluster IDs for the clusters that carry rampable attributes
pub mod id {
    pub const BASIC: u16 = 0x0000;
    pub const IDENTIFY: u16 = 0x0003;
    pub const ON_OFF: u16 = 0x0006;
    pub const LEVEL_CONTROL: u16 = 0x0008;
    pub const WINDOW_COVERING: u16 = 0x0102;
    pub const THERMOSTAT: u16 = 0x0201;
    pub const COLOR_CONTROL: u16 = 0x0300;
}

/// Profile IDs
pub mod profile {
    pub const HOME_AUTOMATION: u16 = 0x0104;
}

/// Level Control cluster attributes
pub mod level_attr {
    pub const CURRENT_LEVEL: u16 = 0x0000;
    pub const REMAINING_TIME: u16 = 0x0001;
    pub const ON_LEVEL: u16 = 0x0011;
}

/// Color Control cluster attributes
pub mod color_attr {
    pub const CURRENT_HUE: u16 = 0x0000;
    pub const CURRENT_SATURATION: u16 = 0x0001;
    pub const CURRENT_X: u16 = 0x0003;
    pub const CURRENT_Y: u16 = 0x0004;
    pub const COLOR_TEMPERATURE: u16 = 0x0007;
}

/// Conventional value ranges for rampable attributes
pub mod range {
    /// Level Control: 0x00 (off) to 0xFE (full)
    pub const LEVEL_MIN: u16 = 0x00;
    pub const LEVEL_MAX: u16 = 0xFE;
    /// Hue and saturation share the 8-bit ZCL range
    pub const HUE_MIN: u16 = 0x00;
    pub const HUE_MAX: u16 = 0xFE;
    /// Color temperature in mireds, typical tunable-white span
    pub const COLOR_TEMP_MIN: u16 = 153;
    pub const COLOR_TEMP_MAX: u16 = 500;
}

/// ZCL status codes returned by attribute writes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ZclStatus {
    Success = 0x00,
    Failure = 0x01,
    NotAuthorized = 0x7E,
    InvalidField = 0x85,
    UnsupportedAttribute = 0x86,
    InvalidValue = 0x87,
    ReadOnly = 0x88,
}

impl ZclStatus {
    /// Check for the success code
    #[must_use]
    pub fn is_success(self) -> bool {
        self == ZclStatus::Success
    }
}

impl TryFrom<u8> for ZclStatus {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, u8> {
        match value {
            0x00 => Ok(ZclStatus::Success),
            0x01 => Ok(ZclStatus::Failure),
            0x7E => Ok(ZclStatus::NotAuthorized),
            0x85 => Ok(ZclStatus::InvalidField),
            0x86 => Ok(ZclStatus::UnsupportedAttribute),
            0x87 => Ok(ZclStatus::InvalidValue),
            0x88 => Ok(ZclStatus::ReadOnly),
            _ => Err(value),
        }
    }
}
