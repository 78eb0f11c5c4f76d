/// EUI-64 (8 bytes)
pub type EUI64 = [u8; 8];
/// AES-128 key (16 bytes)
pub type AESKey = [u8; 16];
/// Device address, as the 32-bit value the network assigned
pub type DevAddr = u32;
/// Network identifier
pub type NetId = u32;

/// OTAA provisioning info as the MAC engine consumes it
///
/// `app_eui` and `dev_eui` are least-significant byte first, the reverse of
/// the order they were typed in and stored. `app_key` is in typed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OtaaCredentials {
    /// Application EUI, LSB first
    pub app_eui: EUI64,
    /// Device EUI, LSB first
    pub dev_eui: EUI64,
    /// Application root key
    pub app_key: AESKey,
}

/// ABP provisioning info as the MAC engine consumes it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AbpCredentials {
    /// Network session key
    pub nwk_skey: AESKey,
    /// Application session key
    pub app_skey: AESKey,
    /// Device address
    pub dev_addr: DevAddr,
    /// Network identifier
    pub net_id: NetId,
    /// Uplink frame counter, 0 when none was stored
    pub fcnt_up: u32,
    /// Downlink frame counter, 0 when none was stored
    pub fcnt_down: u32,
}

impl OtaaCredentials {
    /// Build engine-order credentials from EUIs in stored (typed) order
    pub fn from_stored(app_eui: EUI64, dev_eui: EUI64, app_key: AESKey) -> Self {
        let mut app_eui = app_eui;
        let mut dev_eui = dev_eui;
        app_eui.reverse();
        dev_eui.reverse();
        Self {
            app_eui,
            dev_eui,
            app_key,
        }
    }
}

impl AbpCredentials {
    /// Create ABP credentials with both frame counters at zero
    pub fn new(dev_addr: DevAddr, net_id: NetId, nwk_skey: AESKey, app_skey: AESKey) -> Self {
        Self {
            nwk_skey,
            app_skey,
            dev_addr,
            net_id,
            fcnt_up: 0,
            fcnt_down: 0,
        }
    }
}
