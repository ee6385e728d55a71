//! Sample employees database.
//!
//! Database 24 holds file 11 (`EMPLOYEES`) and the map
//! `EMPLOYEES-NAT-DDM` over it, with its map repository at `[24,4]`.
//! The `adaquery` binary and the integration tests run against it.

use crate::ddm::Ddm;
use crate::fdt::{Fdt, FieldDef, FieldType, GroupField};
use crate::nucleus::{MemoryNucleus, NucleusParams};
use crate::value::FieldValue;
use crate::AdaResult;

/// Database id of the sample database.
pub const DATABASE_ID: u32 = 24;
/// File number of the employees file.
pub const EMPLOYEES_FILE: u32 = 11;
/// Name of the map over the employees file.
pub const EMPLOYEES_MAP: &str = "EMPLOYEES-NAT-DDM";

fn employees_fdt() -> AdaResult<Fdt> {
    let mut fdt = Fdt::new();
    for def in [
        FieldDef::alpha("AA", 8),
        FieldDef::alpha("AC", 20),
        FieldDef::alpha("AD", 20),
        FieldDef::alpha("AE", 20),
        FieldDef::alpha("AF", 1),
        FieldDef::alpha("AG", 1),
        FieldDef::new("AH", FieldType::Unpacked, 8),
        FieldDef::alpha("AJ", 20),
        FieldDef::alpha("AO", 6),
        FieldDef::new("AS", FieldType::Packed, 5),
        FieldDef::new("AT", FieldType::FixedPoint, 2),
    ] {
        fdt.add_field(def)?;
    }
    fdt.add_group(
        GroupField::new("AB")
            .with_member("AC")
            .with_member("AD")
            .with_member("AE"),
        EMPLOYEES_FILE,
    )?;
    Ok(fdt)
}

fn employees_map() -> Ddm {
    Ddm::new(EMPLOYEES_MAP, EMPLOYEES_FILE)
        .with_field("PERSONNEL-ID", "AA")
        .with_field("FULL-NAME", "AB")
        .with_field("FIRST-NAME", "AC")
        .with_field("MIDDLE-I", "AD")
        .with_field("NAME", "AE")
        .with_field("MAR-STAT", "AF")
        .with_field("SEX", "AG")
        .with_field("BIRTH", "AH")
        .with_field("CITY", "AJ")
        .with_field("DEPT", "AO")
        .with_field("SALARY", "AS")
        .with_field("LEAVE-DUE", "AT")
}

type Employee<'a> = (&'a str, &'a str, &'a str, &'a str, &'a str, &'a str, i64, &'a str, &'a str, i64, i64);

const EMPLOYEES: [Employee<'static>; 5] = [
    ("11100301", "HANS", "", "BERGHAUS", "M", "M", 19560930, "DARMSTADT", "TECH10", 41500, 19),
    ("11100302", "ROSWITHA", "E", "KOLENCE", "S", "F", 19540312, "FRANKFURT", "SALE20", 38200, 24),
    ("11100303", "KLAUS", "P", "DIETRICH", "M", "M", 19621107, "DARMSTADT", "TECH10", 45800, 30),
    ("11300311", "ELENA", "", "VOGEL", "D", "F", 19700220, "MAINZ", "FINA01", 52300, -2),
    ("11300312", "PETER", "J", "SCHNEIDER", "S", "M", 19810615, "WIESBADEN", "SALE20", 36100, 12),
];

/// Build the sample employees nucleus. Any transport is accepted.
pub fn employees_nucleus() -> AdaResult<MemoryNucleus> {
    let params = NucleusParams::new(DATABASE_ID).with_map_repository(DATABASE_ID, 4);
    let mut builder = MemoryNucleus::builder(params);
    builder.define_file(EMPLOYEES_FILE, "EMPLOYEES", employees_fdt()?)?;
    builder.define_map(employees_map())?;
    for (id, first, middle, last, marital, sex, birth, city, dept, salary, leave) in EMPLOYEES {
        builder.store(
            EMPLOYEES_FILE,
            [
                ("AA", FieldValue::alpha(id)),
                ("AC", FieldValue::alpha(first)),
                ("AD", FieldValue::alpha(middle)),
                ("AE", FieldValue::alpha(last)),
                ("AF", FieldValue::alpha(marital)),
                ("AG", FieldValue::alpha(sex)),
                ("AH", FieldValue::Unpacked(birth)),
                ("AJ", FieldValue::alpha(city)),
                ("AO", FieldValue::alpha(dept)),
                ("AS", FieldValue::Packed(salary)),
                ("AT", FieldValue::fixed(2, leave)),
            ],
        )?;
    }
    Ok(builder.build())
}
