//! Choosing which address list to show when several sources disagree.
//!
//! The source with the most addresses wins. Equal sizes are broken in the order
//! memory, session, remote, durable.

use testresult::TestResult;

use homefix::prelude::*;

fn address(id: &str, city: &str) -> TestResult<Address> {
    let valid = NewAddress {
        kind: AddressType::Home,
        address: format!("{id} Station Road"),
        city: city.to_string(),
        pincode: "400001".to_string(),
        latitude: None,
        longitude: None,
    }
    .validate()
    .map_err(|errors| format!("{errors:?}"))?;

    Ok(valid.with_id(AddressId::new(id)))
}

#[test]
fn larger_local_list_beats_a_stale_remote_one() -> TestResult {
    let remote = vec![address("a1", "Mumbai")?];
    let durable = vec![
        address("a1", "Mumbai")?,
        address("local-1700000000000", "Pune")?,
    ];

    let resolved = resolve_addresses(vec![
        (Provenance::Remote, remote),
        (Provenance::Durable, durable),
    ]);

    assert_eq!(
        resolved.provenance,
        Some(Provenance::Durable),
        "expected durable list, got {resolved:?}"
    );
    assert_eq!(resolved.addresses.len(), 2);

    Ok(())
}

#[test]
fn just_created_address_is_preselected() -> TestResult {
    let latest = address("local-1700000000000", "Pune")?;

    let resolved = resolve_addresses(vec![
        (Provenance::Session, vec![latest.clone()]),
        (
            Provenance::Durable,
            vec![address("a1", "Mumbai")?, latest.clone()],
        ),
    ]);

    let preferred = resolved.preferred(Some(&latest.id));

    assert_eq!(
        preferred.map(|address| address.city.as_str()),
        Some("Pune"),
        "expected the latest address, got {preferred:?}"
    );

    Ok(())
}

#[test]
fn equal_sizes_prefer_memory_then_session() -> TestResult {
    let resolved = resolve_addresses(vec![
        (Provenance::Durable, vec![address("d", "Delhi")?]),
        (Provenance::Remote, vec![address("r", "Chennai")?]),
        (Provenance::Session, vec![address("s", "Kolkata")?]),
    ]);
    assert_eq!(resolved.provenance, Some(Provenance::Session));

    let resolved = resolve_addresses(vec![
        (Provenance::Session, vec![address("s", "Kolkata")?]),
        (Provenance::Memory, vec![address("m", "Jaipur")?]),
    ]);
    assert_eq!(resolved.provenance, Some(Provenance::Memory));

    Ok(())
}

#[test]
fn invalid_form_reports_every_field() {
    let result = NewAddress {
        pincode: "40001".to_string(),
        ..NewAddress::default()
    }
    .validate();

    let errors = result.err().unwrap_or_default();

    assert_eq!(errors.get("address"), Some("Address is required"));
    assert_eq!(errors.get("city"), Some("City is required"));
    assert_eq!(
        errors.get("pincode"),
        Some("Pincode must be 6 digits"),
        "expected a pincode error, got {errors:?}"
    );
}
