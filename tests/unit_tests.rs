use lorastack::{
    config::device::{AbpCredentials, OtaaCredentials},
    hex::{self, HexBytes, HexError},
    store::{
        keys, session::SESSION_SIZE_V1, session::SESSION_TAG_V1, CredentialField,
        CredentialStore, KeyValueStore, ProvisionError, RamStore, SessionError, SessionInfo,
        SessionStore, SessionValidity, StoreError,
    },
};

use mock::SpyStore;

const APP_EUI: &str = "0001020304050607";
const DEV_EUI: &str = "70B3D57ED0001234";
const APP_KEY: &str = "000102030405060708090A0B0C0D0E0F";
const NET_ID: u32 = 0x13;

fn test_session() -> SessionInfo {
    let mut session = SessionInfo::new(0x13, 0x2601_1BDA, [0x11; 16], [0x22; 16]);
    session.fcnt_up = 7;
    session.fcnt_down = 3;
    session
}

#[test]
fn test_hex_decode() {
    let bytes: [u8; 4] = hex::decode_fixed("26011bDA").unwrap();
    assert_eq!(bytes, [0x26, 0x01, 0x1B, 0xDA]);

    let key: [u8; 16] = hex::decode_fixed(APP_KEY).unwrap();
    assert_eq!(key[0], 0x00);
    assert_eq!(key[15], 0x0F);
}

#[test]
fn test_hex_decode_rejects_malformed() {
    assert_eq!(
        hex::decode_fixed::<8>("00010203040506"),
        Err(HexError::InvalidLength { expected: 16, actual: 14 })
    );
    assert_eq!(
        hex::decode_fixed::<8>("000102030405060708"),
        Err(HexError::InvalidLength { expected: 16, actual: 18 })
    );
    assert_eq!(
        hex::decode_fixed::<4>("0x011BDA"),
        Err(HexError::InvalidDigit { index: 1 })
    );
    assert_eq!(
        hex::decode_fixed::<4>("26-11BDA"),
        Err(HexError::InvalidDigit { index: 2 })
    );
    // Multi-byte characters count as bytes and are not hex
    assert!(hex::decode_fixed::<2>("0é1").is_err());
    assert!(hex::decode_fixed::<1>("").is_err());
}

#[test]
fn test_hex_display() {
    let bytes = [0x00, 0xAB, 0x10, 0xFF];
    assert_eq!(format!("{}", HexBytes(&bytes)), "00ab10ff");
    assert_eq!(format!("{:X}", HexBytes(&bytes)), "00AB10FF");
}

#[test]
fn test_ram_store() {
    let store: RamStore<4> = RamStore::new();
    assert!(store.is_empty());

    store.set("APPKEY", &[0x01; 16]).unwrap();
    let mut buf = [0u8; 16];
    store.get("APPKEY", &mut buf).unwrap();
    assert_eq!(buf, [0x01; 16]);

    let mut short = [0u8; 8];
    assert_eq!(
        store.get("APPKEY", &mut short),
        Err(StoreError::SizeMismatch { expected: 8, actual: 16 })
    );
    assert_eq!(store.get("DEVEUI", &mut short), Err(StoreError::NotFound));

    store.set_u32("FCNTUP", 42).unwrap();
    assert_eq!(store.get_u32("FCNTUP"), Ok(42));
    store.set_u32("FCNTUP", 43).unwrap();
    assert_eq!(store.get_u32("FCNTUP"), Ok(43));
    assert_eq!(store.len(), 2);

    // Oversized keys and values, and a full table
    assert_eq!(store.set("TOOLONGKEY", &[0]), Err(StoreError::Io));
    assert_eq!(store.set("BIG", &[0; 17]), Err(StoreError::Io));
    store.set("A", &[1]).unwrap();
    store.set("B", &[2]).unwrap();
    assert_eq!(store.set("C", &[3]), Err(StoreError::Io));
}

#[test]
fn test_provision_otaa_reverses_euis_on_load_only() {
    let store: RamStore<16> = RamStore::new();
    let credentials = CredentialStore::new(&store, NET_ID);

    credentials
        .provision_otaa("0001020304050607", "0001020304050607", APP_KEY)
        .unwrap();

    // Stored in typed order
    let mut raw = [0u8; 8];
    store.get(keys::APP_EUI, &mut raw).unwrap();
    assert_eq!(raw, [0, 1, 2, 3, 4, 5, 6, 7]);
    store.get(keys::DEV_EUI, &mut raw).unwrap();
    assert_eq!(raw, [0, 1, 2, 3, 4, 5, 6, 7]);
    assert_eq!(store.get_u32(keys::NET_ID), Ok(NET_ID));

    let otaa = credentials.load_otaa().unwrap();
    assert_eq!(otaa.app_eui, [7, 6, 5, 4, 3, 2, 1, 0]);
    assert_eq!(otaa.dev_eui, [7, 6, 5, 4, 3, 2, 1, 0]);
    assert_eq!(
        otaa.app_key,
        [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15]
    );

    // Loading does not rewrite the store
    store.get(keys::APP_EUI, &mut raw).unwrap();
    assert_eq!(raw, [0, 1, 2, 3, 4, 5, 6, 7]);
}

#[test]
fn test_provision_otaa_distinct_euis() {
    let store: RamStore<16> = RamStore::new();
    let credentials = CredentialStore::new(&store, NET_ID);
    credentials.provision_otaa(APP_EUI, DEV_EUI, APP_KEY).unwrap();

    let expected = OtaaCredentials {
        app_eui: [0x07, 0x06, 0x05, 0x04, 0x03, 0x02, 0x01, 0x00],
        dev_eui: [0x34, 0x12, 0x00, 0xD0, 0x7E, 0xD5, 0xB3, 0x70],
        app_key: hex::decode_fixed(APP_KEY).unwrap(),
    };
    assert_eq!(credentials.load_otaa(), Some(expected));
}

#[test]
fn test_provision_invalid_hex_writes_nothing() {
    let store = SpyStore::new();
    let credentials = CredentialStore::new(&store, NET_ID);

    let err = credentials
        .provision_otaa(APP_EUI, "70B3D57ED000123", APP_KEY)
        .unwrap_err();
    assert_eq!(
        err,
        ProvisionError::InvalidCredentialFormat {
            field: CredentialField::DevEui,
            error: HexError::InvalidLength { expected: 16, actual: 15 },
        }
    );

    let err = credentials
        .provision_otaa(APP_EUI, DEV_EUI, "000102030405060708090A0B0C0D0E0G")
        .unwrap_err();
    assert!(matches!(
        err,
        ProvisionError::InvalidCredentialFormat { field: CredentialField::AppKey, .. }
    ));

    let err = credentials
        .personalize_abp("26011BD", &APP_KEY[..], &APP_KEY[..])
        .unwrap_err();
    assert!(matches!(
        err,
        ProvisionError::InvalidCredentialFormat { field: CredentialField::DevAddr, .. }
    ));

    assert_eq!(store.calls(), 0);
}

#[test]
fn test_provision_write_failure_reported() {
    let store = SpyStore::new();
    store.fail_key.set(Some(keys::DEV_EUI));
    let credentials = CredentialStore::new(&store, NET_ID);

    let err = credentials.provision_otaa(APP_EUI, DEV_EUI, APP_KEY).unwrap_err();
    assert_eq!(
        err,
        ProvisionError::StoreWriteFailed { key: keys::DEV_EUI, error: StoreError::Io }
    );
    // Every write is still attempted
    assert_eq!(store.sets.get(), 4);
    // The partial record never loads as valid
    assert_eq!(credentials.load_otaa(), None);
}

#[test]
fn test_personalize_abp() {
    let store: RamStore<16> = RamStore::new();
    let credentials = CredentialStore::new(&store, NET_ID);

    credentials
        .personalize_abp(
            "26011BDA",
            "2B7E151628AED2A6ABF7158809CF4F3C",
            "2b7e151628aed2a6abf7158809cf4f3d",
        )
        .unwrap();

    assert_eq!(store.get_u32(keys::DEV_ADDR), Ok(0x2601_1BDA));
    let mut raw = [0u8; 4];
    store.get(keys::DEV_ADDR, &mut raw).unwrap();
    assert_eq!(raw, [0xDA, 0x1B, 0x01, 0x26]);

    let abp = credentials.load_abp().unwrap();
    let mut expected = AbpCredentials::new(
        0x2601_1BDA,
        NET_ID,
        hex::decode_fixed("2B7E151628AED2A6ABF7158809CF4F3C").unwrap(),
        hex::decode_fixed("2B7E151628AED2A6ABF7158809CF4F3D").unwrap(),
    );
    // Counters were never stored
    assert_eq!(abp, expected);
    assert_eq!((abp.fcnt_up, abp.fcnt_down), (0, 0));

    store.set_u32(keys::FCNT_UP, 10).unwrap();
    store.set_u32(keys::FCNT_DOWN, 4).unwrap();
    expected.fcnt_up = 10;
    expected.fcnt_down = 4;
    assert_eq!(credentials.load_abp(), Some(expected));
}

#[test]
fn test_load_abp_requires_primary_fields() {
    let store: RamStore<16> = RamStore::new();
    let credentials = CredentialStore::new(&store, NET_ID);
    assert_eq!(credentials.load_abp(), None);

    store.set(keys::NWK_SKEY, &[1; 16]).unwrap();
    store.set(keys::APP_SKEY, &[2; 16]).unwrap();
    store.set_u32(keys::DEV_ADDR, 1).unwrap();
    assert_eq!(credentials.load_abp(), None);

    // Wrong-sized NETID is as good as missing
    store.set(keys::NET_ID, &[0x13]).unwrap();
    assert_eq!(credentials.load_abp(), None);

    store.set_u32(keys::NET_ID, NET_ID).unwrap();
    assert!(credentials.load_abp().is_some());
}

#[test]
fn test_session_round_trip() {
    let store: RamStore<16> = RamStore::new();
    let mut sessions = SessionStore::new(&store);
    assert_eq!(sessions.validity(), SessionValidity::Unknown);

    let session = test_session();
    sessions.save(&session).unwrap();
    assert_eq!(sessions.validity(), SessionValidity::Valid);

    let loaded = sessions.load().unwrap();
    assert_eq!(loaded, session);
    assert_eq!(loaded.tag, SESSION_TAG_V1);
    assert_eq!(loaded.size, SESSION_SIZE_V1);

    // A fresh store instance over the same medium sees the same record
    let mut reopened = SessionStore::new(&store);
    assert_eq!(reopened.load(), Some(session));
}

#[test]
fn test_session_schema_mismatch_writes_nothing() {
    let store = SpyStore::new();
    let mut sessions = SessionStore::new(&store);

    let mut session = test_session();
    session.tag = 0x02;
    assert_eq!(
        sessions.save(&session),
        Err(SessionError::SchemaMismatch { tag: 0x02, size: SESSION_SIZE_V1 })
    );

    let mut session = test_session();
    session.size = 48;
    assert!(matches!(
        sessions.save(&session),
        Err(SessionError::SchemaMismatch { size: 48, .. })
    ));

    assert_eq!(store.calls(), 0);
    assert_eq!(sessions.validity(), SessionValidity::Invalid);
    assert_eq!(sessions.load(), None);
}

#[test]
fn test_session_invalid_until_saved() {
    let store: RamStore<16> = RamStore::new();
    let mut sessions = SessionStore::new(&store);
    sessions.save(&test_session()).unwrap();

    let mut bad = test_session();
    bad.tag = 0;
    assert!(sessions.save(&bad).is_err());
    // The stored record is intact but no longer trusted
    assert_eq!(sessions.load(), None);

    sessions.save(&test_session()).unwrap();
    assert_eq!(sessions.load(), Some(test_session()));
}

#[test]
fn test_session_load_fails_on_missing_key() {
    let store: RamStore<16> = RamStore::new();
    let mut sessions = SessionStore::new(&store);

    // ABP personalization leaves the counters unset
    CredentialStore::new(&store, NET_ID)
        .personalize_abp("26011BDA", APP_KEY, APP_KEY)
        .unwrap();
    assert_eq!(sessions.load(), None);
    assert_eq!(sessions.validity(), SessionValidity::Invalid);
}

#[test]
fn test_session_load_fails_on_unreadable_key() {
    let store = SpyStore::new();
    let mut sessions = SessionStore::new(&store);
    sessions.save(&test_session()).unwrap();

    store.fail_read_key.set(Some(keys::APP_SKEY));
    let mut reopened = SessionStore::new(&store);
    assert_eq!(reopened.load(), None);
    assert_eq!(reopened.validity(), SessionValidity::Invalid);

    // Stays untrusted once the medium recovers
    store.fail_read_key.set(None);
    assert_eq!(reopened.load(), None);
}

#[test]
fn test_session_load_fails_on_wrong_sized_key() {
    let store: RamStore<16> = RamStore::new();
    let mut sessions = SessionStore::new(&store);
    sessions.save(&test_session()).unwrap();

    store.set(keys::DEV_ADDR, &[0xDA, 0x1B]).unwrap();
    let mut reopened = SessionStore::new(&store);
    assert_eq!(reopened.load(), None);
    assert_eq!(reopened.validity(), SessionValidity::Invalid);
}

#[test]
fn test_load_otaa_fails_on_bad_reads() {
    let store = SpyStore::new();
    let credentials = CredentialStore::new(&store, NET_ID);
    credentials.provision_otaa(APP_EUI, DEV_EUI, APP_KEY).unwrap();
    assert!(credentials.load_otaa().is_some());

    store.fail_read_key.set(Some(keys::APP_KEY));
    assert_eq!(credentials.load_otaa(), None);
    store.fail_read_key.set(None);

    // Wrong-length APPEUI
    store.set(keys::APP_EUI, &[0, 1, 2, 3]).unwrap();
    assert_eq!(credentials.load_otaa(), None);
}

#[test]
fn test_load_abp_counter_read_failure_defaults_to_zero() {
    let store = SpyStore::new();
    let credentials = CredentialStore::new(&store, NET_ID);
    credentials
        .personalize_abp("26011BDA", APP_KEY, APP_KEY)
        .unwrap();
    store.set_u32(keys::FCNT_UP, 42).unwrap();
    store.set_u32(keys::FCNT_DOWN, 7).unwrap();

    store.fail_read_key.set(Some(keys::FCNT_UP));
    let abp = credentials.load_abp().unwrap();
    assert_eq!(abp.fcnt_up, 0);
    assert_eq!(abp.fcnt_down, 7);
    assert_eq!(abp.dev_addr, 0x2601_1BDA);

    // A primary field read failure is not recoverable
    store.fail_read_key.set(Some(keys::NWK_SKEY));
    assert_eq!(credentials.load_abp(), None);
}

#[test]
fn test_session_save_stops_at_first_failure() {
    let store = SpyStore::new();
    store.fail_key.set(Some(keys::NWK_SKEY));
    let mut sessions = SessionStore::new(&store);

    assert_eq!(
        sessions.save(&test_session()),
        Err(SessionError::StoreWriteFailed { key: keys::NWK_SKEY, error: StoreError::Io })
    );
    // NETID, DEVADDR, then the failing NWKSKEY
    assert_eq!(store.sets.get(), 3);
    assert!(store.inner.contains(keys::DEV_ADDR));
    assert!(!store.inner.contains(keys::APP_SKEY));
    assert_eq!(sessions.validity(), SessionValidity::Invalid);
    assert_eq!(sessions.load(), None);
}

#[test]
fn test_frame_counter_fast_path() {
    let store: RamStore<16> = RamStore::new();
    let mut sessions = SessionStore::new(&store);
    let session = test_session();
    sessions.save(&session).unwrap();

    sessions.save_fcnt_up(42);
    let loaded = sessions.load().unwrap();
    assert_eq!(loaded.fcnt_up, 42);
    assert_eq!(loaded.fcnt_down, session.fcnt_down);
    assert_eq!(loaded.nwk_skey, session.nwk_skey);
    assert_eq!(loaded.dev_addr, session.dev_addr);

    sessions.save_fcnt_down(9);
    assert_eq!(sessions.load().unwrap().fcnt_down, 9);
    assert_eq!(sessions.validity(), SessionValidity::Valid);
}

#[test]
fn test_frame_counter_failure_is_swallowed() {
    let store = SpyStore::new();
    let mut sessions = SessionStore::new(&store);
    sessions.save(&test_session()).unwrap();

    store.fail_writes.set(true);
    sessions.save_fcnt_up(100);
    sessions.save_fcnt_down(100);

    store.fail_writes.set(false);
    assert_eq!(sessions.load().unwrap().fcnt_up, 7);
}
