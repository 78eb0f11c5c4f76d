use super::device::NetId;

/// The Things Network's network identifier
pub const TTN_NETWORK_ID: NetId = 0x13;

/// Default spreading factor handed to the engine
pub const DEFAULT_SPREADING_FACTOR: u8 = 7;

/// Default frequency sub-band handed to the engine
pub const DEFAULT_SUB_BAND: u8 = 2;

/// Regional frequency plan
///
/// Opaque to this crate; the engine interprets it at `begin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[allow(non_camel_case_types)]
pub enum FrequencyPlan {
    /// Europe 863-870 MHz
    EU868,
    /// United States 902-928 MHz
    US915,
    /// Asia 920-923 MHz
    AS920_923,
    /// Asia 923-925 MHz
    AS923_925,
    /// Korea 920-923 MHz
    KR920_923,
}

/// Stack configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackConfig {
    /// Frequency plan
    pub frequency_plan: FrequencyPlan,
    /// Spreading factor (7-12)
    pub spreading_factor: u8,
    /// Frequency sub-band
    pub sub_band: u8,
    /// Network id written alongside provisioned credentials
    pub net_id: NetId,
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            frequency_plan: FrequencyPlan::US915,
            spreading_factor: DEFAULT_SPREADING_FACTOR,
            sub_band: DEFAULT_SUB_BAND,
            net_id: TTN_NETWORK_ID,
        }
    }
}

impl StackConfig {
    /// Create a configuration for the given plan with default parameters
    pub fn new(frequency_plan: FrequencyPlan) -> Self {
        Self {
            frequency_plan,
            ..Self::default()
        }
    }

    /// Set the spreading factor
    pub fn with_spreading_factor(mut self, spreading_factor: u8) -> Self {
        self.spreading_factor = spreading_factor;
        self
    }

    /// Set the frequency sub-band
    pub fn with_sub_band(mut self, sub_band: u8) -> Self {
        self.sub_band = sub_band;
        self
    }

    /// Set the network id
    pub fn with_net_id(mut self, net_id: NetId) -> Self {
        self.net_id = net_id;
        self
    }
}
