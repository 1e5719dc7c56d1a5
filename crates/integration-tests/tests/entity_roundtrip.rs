//! Round-trip tests for the persisted entity representations.
//!
//! Serializing a record and reading it back must yield an identical value;
//! server-assigned timestamps are pinned in the fixtures so equality is
//! exact.

use chrono::{TimeZone, Utc};
use url::Url;

use itadaki_core::{
    Action, BusinessType, CandidateId, CompanyId, Email, Permission, PermissionSet, Resource,
    StoreId, StoreStatus, UserId, UserRole, UserStatus,
};
use itadaki_web::models::{Store, User};

#[allow(clippy::unwrap_used)]
fn store() -> Store {
    Store {
        id: StoreId::new(7),
        company_id: CompanyId::new(2),
        name: "すし処 いただき".to_owned(),
        address: "東京都中央区築地1-2-3".to_owned(),
        business_type: BusinessType::CounterOmakase,
        website_url: Some(Url::parse("https://example.com/").unwrap()),
        review_site_url: None,
        social_url: Some(Url::parse("https://social.example/itadaki").unwrap()),
        status: StoreStatus::Open,
        created_at: Utc.with_ymd_and_hms(2025, 11, 4, 9, 30, 0).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2026, 1, 15, 18, 0, 0).unwrap(),
    }
}

#[allow(clippy::unwrap_used)]
fn user() -> User {
    let mut permissions = PermissionSet::new();
    permissions.grant(Permission::new(Resource::Jobs, [Action::Read, Action::Update]));
    permissions.grant(Permission::new(Resource::Candidates, [Action::Read]));

    User {
        id: UserId::new(3),
        email: Email::parse("hanako@itadaki.jp").unwrap(),
        display_name: "佐藤花子".to_owned(),
        role: UserRole::Manager,
        status: UserStatus::Active,
        phone: Some("03-1234-5678".to_owned()),
        avatar_url: None,
        permissions,
        assigned_candidates: vec![CandidateId::new(100), CandidateId::new(101)],
        assigned_companies: vec![CompanyId::new(2)],
        last_login_at: Some(Utc.with_ymd_and_hms(2026, 2, 1, 8, 5, 0).unwrap()),
        created_at: Utc.with_ymd_and_hms(2025, 10, 1, 0, 0, 0).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2026, 2, 1, 8, 5, 0).unwrap(),
    }
}

#[test]
#[allow(clippy::unwrap_used)]
fn test_store_roundtrip_is_identity() {
    let original = store();
    let json = serde_json::to_string(&original).unwrap();
    let back: Store = serde_json::from_str(&json).unwrap();
    assert_eq!(back, original);
}

#[test]
#[allow(clippy::unwrap_used)]
fn test_user_roundtrip_is_identity() {
    let original = user();
    let json = serde_json::to_string(&original).unwrap();
    let back: User = serde_json::from_str(&json).unwrap();
    assert_eq!(back, original);
}

#[test]
#[allow(clippy::unwrap_used)]
fn test_enumerated_fields_serialize_to_wire_names() {
    let json = serde_json::to_value(store()).unwrap();
    assert_eq!(json["business_type"], "counter_omakase");
    assert_eq!(json["status"], "open");

    let json = serde_json::to_value(user()).unwrap();
    assert_eq!(json["role"], "manager");
    assert_eq!(json["status"], "active");
    assert_eq!(json["permissions"][0]["resource"], "candidates");
}

#[test]
fn test_unknown_enum_values_fail_deserialization() {
    let mut json = serde_json::to_value(store()).expect("serialize");
    json["business_type"] = "izakaya".into();
    assert!(serde_json::from_value::<Store>(json).is_err());

    let mut json = serde_json::to_value(user()).expect("serialize");
    json["role"] = "owner".into();
    assert!(serde_json::from_value::<User>(json).is_err());
}
