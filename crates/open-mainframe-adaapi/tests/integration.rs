//! Integration tests: full sessions against the sample employees database.

use open_mainframe_adaapi::demo::{self, EMPLOYEES_FILE, EMPLOYEES_MAP};
use open_mainframe_adaapi::{
    AdaError, Ddm, Fdt, FieldDef, FieldList, FieldValue, GroupField, MemoryNucleus,
    NucleusParams, QueryProfile, Session, Target,
};

fn nucleus() -> MemoryNucleus {
    demo::employees_nucleus().unwrap()
}

fn file_session(nucleus: &MemoryNucleus) -> Session {
    Session::open(nucleus, "acj;target=24;config=[24,4]").unwrap()
}

/// Map search through the DDM returns long names and the stored id.
#[test]
fn search_by_map_name() {
    let nucleus = nucleus();
    let mut session = Session::open(&nucleus, "transport;mapping;config=[24,4]").unwrap();
    let count = session
        .search_by_name(
            EMPLOYEES_MAP,
            &["PERSONNEL-ID", "FULL-NAME", "BIRTH"],
            "PERSONNEL-ID=11100301",
        )
        .unwrap();
    assert_eq!(count, 1);
    assert_eq!(session.string_value(1, "PERSONNEL-ID").unwrap(), "11100301");
    assert_eq!(
        session.field_names().unwrap(),
        ["PERSONNEL-ID", "FIRST-NAME", "MIDDLE-I", "NAME", "BIRTH"]
    );
    assert_eq!(session.string_value(1, "NAME").unwrap(), "BERGHAUS");
    assert_eq!(session.integer_value(1, "BIRTH").unwrap(), 19560930);
    session.close().unwrap();
}

/// File search by number reads the unpacked birth date as an integer.
#[test]
fn search_by_file_number() {
    let nucleus = nucleus();
    let mut session = file_session(&nucleus);
    let count = session
        .search_by_id(EMPLOYEES_FILE, &["AA", "AB", "AH"], "AA=11100301")
        .unwrap();
    assert_eq!(count, 1);
    assert_eq!(session.integer_value(1, "AH").unwrap(), 19560930);
    assert_eq!(session.string_value(1, "AC").unwrap(), "HANS");
    assert!(matches!(
        session.integer_value(1, "AA"),
        Err(AdaError::TypeMismatch { .. })
    ));
}

#[test]
fn close_invalidates_every_operation() {
    let nucleus = nucleus();
    let mut session = file_session(&nucleus);
    session.search_by_id(EMPLOYEES_FILE, &["AA"], "AA=11100301").unwrap();
    session.close().unwrap();

    assert!(matches!(session.close(), Err(AdaError::InvalidHandle)));
    assert!(matches!(
        session.search_by_id(EMPLOYEES_FILE, &["AA"], "AA=11100301"),
        Err(AdaError::InvalidHandle)
    ));
    assert!(matches!(
        session.search_by_name(EMPLOYEES_MAP, &["PERSONNEL-ID"], "PERSONNEL-ID=1"),
        Err(AdaError::InvalidHandle)
    ));
    assert!(matches!(session.field_names(), Err(AdaError::InvalidHandle)));
    assert!(matches!(session.string_value(1, "AA"), Err(AdaError::InvalidHandle)));
    assert!(matches!(session.integer_value(1, "AA"), Err(AdaError::InvalidHandle)));
    assert!(matches!(session.records(), Err(AdaError::InvalidHandle)));
}

#[test]
fn valid_indices_are_one_to_count() {
    let nucleus = nucleus();
    let mut session = file_session(&nucleus);
    let n = session
        .search_by_id(EMPLOYEES_FILE, &["AA", "AH"], "AJ=DARMSTADT")
        .unwrap();
    assert_eq!(n, 2);
    let n = n as i64;
    for index in 1..=n {
        assert!(session.string_value(index, "AA").is_ok());
        assert!(session.integer_value(index, "AH").is_ok());
    }
    for index in [0, n + 1, -1, i64::MIN] {
        assert!(matches!(
            session.string_value(index, "AA"),
            Err(AdaError::OutOfRange { .. })
        ));
        assert!(matches!(
            session.integer_value(index, "AH"),
            Err(AdaError::OutOfRange { .. })
        ));
    }
}

#[test]
fn empty_result_has_no_valid_index() {
    let nucleus = nucleus();
    let mut session = file_session(&nucleus);
    let n = session
        .search_by_id(EMPLOYEES_FILE, &["AA"], "AA=99999999")
        .unwrap();
    assert_eq!(n, 0);
    assert_eq!(session.field_names().unwrap(), ["AA"]);
    assert!(matches!(
        session.string_value(1, "AA"),
        Err(AdaError::OutOfRange { count: 0, .. })
    ));
}

#[test]
fn enumerated_names_are_exactly_the_accepted_ones() {
    let nucleus = nucleus();
    let mut session = file_session(&nucleus);
    session
        .search_by_id(EMPLOYEES_FILE, &["AB", "AJ"], "AO=TECH10")
        .unwrap();
    let names = session.field_names().unwrap();
    for name in &names {
        assert!(session.string_value(1, name).is_ok(), "{name}");
    }
    for absent in ["AA", "AB", "AH", "PERSONNEL-ID", ""] {
        assert!(!names.iter().any(|n| n == absent));
        assert!(matches!(
            session.string_value(1, absent),
            Err(AdaError::UnknownField { .. })
        ));
    }
}

#[test]
fn reads_are_idempotent() {
    let nucleus = nucleus();
    let mut session = file_session(&nucleus);
    session
        .search_by_id(EMPLOYEES_FILE, &["AA", "AE", "AT"], "AG=F")
        .unwrap();
    assert_eq!(session.field_names().unwrap(), session.field_names().unwrap());
    assert_eq!(
        session.string_value(2, "AE").unwrap(),
        session.string_value(2, "AE").unwrap()
    );
    assert_eq!(session.integer_value(2, "AT").unwrap(), -2);
    assert_eq!(session.integer_value(2, "AT").unwrap(), -2);
}

#[test]
fn non_numeric_string_is_not_an_integer() {
    let nucleus = nucleus();
    let mut session = file_session(&nucleus);
    session
        .search_by_id(EMPLOYEES_FILE, &["AE"], "AA=11100302")
        .unwrap();
    assert_eq!(session.string_value(1, "AE").unwrap(), "KOLENCE");
    assert!(matches!(
        session.integer_value(1, "AE"),
        Err(AdaError::TypeMismatch { .. })
    ));
}

#[test]
fn enumeration_before_search_is_invalid_state() {
    let nucleus = nucleus();
    let session = file_session(&nucleus);
    assert!(matches!(session.field_names(), Err(AdaError::InvalidState)));
    assert!(matches!(session.string_value(1, "AA"), Err(AdaError::InvalidState)));
}

#[test]
fn failed_search_discards_previous_result() {
    let nucleus = nucleus();
    let mut session = file_session(&nucleus);
    session.search_by_id(EMPLOYEES_FILE, &["AA"], "AA=11100301").unwrap();

    let err = session
        .search_by_id(EMPLOYEES_FILE, &["AA"], "AA=11100301 AND")
        .unwrap_err();
    assert!(matches!(err, AdaError::Search { code: 61, .. }));
    assert!(matches!(session.field_names(), Err(AdaError::InvalidState)));
}

#[test]
fn search_errors_carry_response_codes() {
    let nucleus = nucleus();
    let mut session = file_session(&nucleus);
    let cases: [(Target, &str, &str, i32); 4] = [
        (Target::File(99), "AA", "AA=1", 17),
        (Target::from(EMPLOYEES_MAP), "PERSONNEL-ID", "PERSONNEL-ID=1", 22),
        (Target::File(EMPLOYEES_FILE), "ZZ", "AA=1", 41),
        (Target::File(EMPLOYEES_FILE), "AA", "AH=ABC", 61),
    ];
    for (target, fields, predicate, code) in cases {
        let err = session
            .search(target, &FieldList::parse(fields), predicate)
            .unwrap_err();
        assert!(
            matches!(err, AdaError::Search { code: c, .. } if c == code),
            "{err}"
        );
    }
}

#[test]
fn unreachable_database_fails_to_open() {
    let nucleus = nucleus();
    for config in [
        "acj;target=25",
        "acj;config=[24,5]",
        "acj;target=",
        ";map",
        "acj;;map",
    ] {
        assert!(
            matches!(Session::open(&nucleus, config), Err(AdaError::Connection { .. })),
            "{config}"
        );
    }
    let idle = MemoryNucleus::builder(NucleusParams::new(24).inactive()).build();
    assert!(matches!(
        Session::open(&idle, "acj"),
        Err(AdaError::Connection { .. })
    ));
}

#[test]
fn copy_string_value_into_fixed_buffer() {
    let nucleus = nucleus();
    let mut session = file_session(&nucleus);
    session.search_by_id(EMPLOYEES_FILE, &["AJ"], "AA=11300312").unwrap();

    let mut buf = [0u8; 255];
    let written = session.copy_string_value(1, "AJ", &mut buf).unwrap();
    assert_eq!(&buf[..written], b"WIESBADEN");

    let mut small = [0u8; 4];
    assert!(matches!(
        session.copy_string_value(1, "AJ", &mut small),
        Err(AdaError::BufferTooSmall { needed: 9, capacity: 4, .. })
    ));
}

#[test]
fn builtin_profiles_run_end_to_end() {
    let nucleus = nucleus();
    for name in QueryProfile::builtin_names() {
        let profile = QueryProfile::builtin(name).unwrap();
        let config = if profile.uses_map() {
            "acj;map;config=[24,4]"
        } else {
            "acj;target=24"
        };
        let mut session = Session::open(&nucleus, config).unwrap();
        let count = session
            .search(profile.target.clone(), &profile.field_list(), profile.predicate(None))
            .unwrap();
        assert_eq!(count, 1, "{name}");
        for record in session.records().unwrap() {
            for field in &profile.string_fields {
                assert!(record.string(field).is_ok(), "{name} {field}");
            }
            for field in &profile.integer_fields {
                assert_eq!(record.integer(field).unwrap(), 19560930);
            }
        }
    }
}

#[test]
fn sessions_are_independent() {
    let nucleus = nucleus();
    let mut a = file_session(&nucleus);
    let mut b = file_session(&nucleus);
    a.search_by_id(EMPLOYEES_FILE, &["AA"], "AA=11100301").unwrap();
    b.search_by_id(EMPLOYEES_FILE, &["AA"], "AO=SALE20").unwrap();
    a.close().unwrap();
    assert_eq!(b.record_count().unwrap(), 2);
    assert_eq!(b.string_value(2, "AA").unwrap(), "11300312");
}

#[test]
fn named_map_must_exist_at_open() {
    let nucleus = nucleus();
    assert!(Session::open(&nucleus, "acj;map=EMPLOYEES-NAT-DDM;config=[24,4]").is_ok());
    assert!(matches!(
        Session::open(&nucleus, "acj;map=NOSUCHMAP"),
        Err(AdaError::Connection { .. })
    ));
}

#[test]
fn blank_and_star_names_are_skipped() {
    let nucleus = nucleus();
    let mut session = file_session(&nucleus);
    session
        .search_by_id(EMPLOYEES_FILE, &["*", "AA"], "AA=11100301")
        .unwrap();
    assert_eq!(session.field_names().unwrap(), ["AA"]);

    session
        .search_by_id(EMPLOYEES_FILE, &[""], "AA=11100301")
        .unwrap();
    assert_eq!(session.field_names().unwrap().len(), 11);
}

#[test]
fn map_definition_errors() {
    let mut fdt = Fdt::new();
    fdt.add_field(FieldDef::alpha("AA", 8)).unwrap();
    fdt.add_field(FieldDef::alpha("AC", 20)).unwrap();
    fdt.add_field(FieldDef::alpha("AE", 20)).unwrap();
    fdt.add_group(GroupField::new("AB").with_member("AC").with_member("AE"), 1)
        .unwrap();
    let mut builder = MemoryNucleus::builder(NucleusParams::new(1));
    builder.define_file(1, "PEOPLE", fdt).unwrap();
    assert!(matches!(
        builder.define_map(Ddm::new("DUP", 1).with_field("X", "AC").with_field("X", "AE")),
        Err(AdaError::DuplicateField { .. })
    ));
    builder
        .define_map(Ddm::new("M", 1).with_field("ID", "AA").with_field("NAMES", "AB"))
        .unwrap();
    builder.store(1, [("AA", FieldValue::alpha("1"))]).unwrap();
    let nucleus = builder.build();

    let mut session = Session::open(&nucleus, "acj;map").unwrap();
    assert!(matches!(
        session.search_by_name("M", &["NAMES"], "ID=1"),
        Err(AdaError::Search { code: 41, .. })
    ));
    assert_eq!(session.search_by_name("M", &["ID"], "ID=1").unwrap(), 1);
}
