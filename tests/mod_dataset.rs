use chrono::{TimeZone, Utc};
use csvview::{
    Attr, ColumnMapping, DisplayTimezone, ExportError, FormatOptions, Record, Value, build,
};

struct Address {
    zip: Option<String>,
}

struct Profile {
    name: String,
    is_active: bool,
    created_at: chrono::DateTime<Utc>,
    bio: String,
    address: Address,
}

struct Member {
    profile: Profile,
}

impl Record for Address {
    fn attr(&self, name: &str) -> Option<Attr<'_>> {
        match name {
            "zip" => Some(Attr::Value(self.zip.clone().into())),
            _ => None,
        }
    }
}

impl Record for Profile {
    fn attr(&self, name: &str) -> Option<Attr<'_>> {
        match name {
            "name" => Some(Attr::Value(self.name.as_str().into())),
            "is_active" => Some(Attr::Value(self.is_active.into())),
            "created_at" => Some(Attr::Value(self.created_at.into())),
            "bio" => Some(Attr::Value(self.bio.as_str().into())),
            "address" => Some(Attr::Record(&self.address)),
            "initials" => Some(Attr::accessor(|| {
                self.name.split_whitespace().filter_map(|w| w.chars().next()).collect::<String>().into()
            })),
            _ => None,
        }
    }
}

impl Record for Member {
    fn attr(&self, name: &str) -> Option<Attr<'_>> {
        match name {
            "profile" => Some(Attr::Record(&self.profile)),
            _ => None,
        }
    }
}

fn members() -> Vec<Member> {
    vec![
        Member {
            profile: Profile {
                name: "Ada Lovelace".into(),
                is_active: true,
                created_at: Utc.with_ymd_and_hms(2023, 1, 5, 21, 30, 0).unwrap(),
                bio: "line1\nline2\r\nline3".into(),
                address: Address { zip: Some("55401".into()) },
            },
        },
        Member {
            profile: Profile {
                name: "Brian Kernighan".into(),
                is_active: false,
                created_at: Utc.with_ymd_and_hms(2022, 12, 31, 23, 59, 0).unwrap(),
                bio: "single".into(),
                address: Address { zip: None },
            },
        },
    ]
}

fn eastern() -> FormatOptions {
    FormatOptions { timezone: DisplayTimezone::offset_hours(-5).unwrap(), ..FormatOptions::default() }
}

#[test]
fn test_end_to_end_profile_export() {
    let mapping = ColumnMapping::new()
        .path("Name", "profile.name")
        .unwrap()
        .path("Active", "profile.is_active")
        .unwrap()
        .path("Joined", "profile.created_at")
        .unwrap();
    let ds = build(&mapping, &members(), &eastern()).unwrap();
    assert_eq!(ds.width(), 3);
    assert_eq!(ds.len(), 2);
    let csv = ds.to_csv().unwrap();
    assert!(csv.starts_with("Name,Active,Joined\n"), "{csv}");
    assert_eq!(
        csv,
        "Name,Active,Joined\nAda Lovelace,Yes,01/05/2023 16:30\nBrian Kernighan,No,12/31/2022 18:59\n"
    );
}

#[test]
fn test_struct_records_nested_null_and_accessor() {
    let mapping = ColumnMapping::new()
        .path("Zip", "profile.address.zip")
        .unwrap()
        .path("Initials", "profile.initials")
        .unwrap();
    let ds = build(&mapping, &members(), &FormatOptions::default()).unwrap();
    assert_eq!(ds.rows()[0], vec![Value::from("55401"), Value::from("AL")]);
    assert_eq!(ds.rows()[1], vec![Value::from(""), Value::from("BK")]);
}

#[test]
fn test_newline_policy_applies_per_build() {
    let mapping = ColumnMapping::new().path("Bio", "profile.bio").unwrap();
    let kept = build(&mapping, &members(), &FormatOptions::default()).unwrap();
    assert_eq!(kept.rows()[0][0], Value::from("line1\nline2\r\nline3"));
    let stripped = FormatOptions { allow_newlines: false, ..FormatOptions::default() };
    let joined = build(&mapping, &members(), &stripped).unwrap();
    assert_eq!(joined.rows()[0][0], Value::from("line1, line2, line3"));
}

#[test]
fn test_computed_column_receives_label() {
    let mapping = ColumnMapping::new()
        .path("Name", "profile.name")
        .unwrap()
        .computed("Source", |_obj, label| Ok(Value::from(format!("{label}=X"))))
        .unwrap();
    let ds = build(&mapping, &members(), &FormatOptions::default()).unwrap();
    assert!(ds.rows().iter().all(|r| r[1] == Value::from("Source=X")));
}

#[test]
fn test_computed_column_can_read_the_record() {
    let mapping = ColumnMapping::new()
        .computed("Upper", |obj, _label| {
            let profile = match obj.attr("profile") {
                Some(Attr::Record(p)) => p,
                _ => return Err("no profile".into()),
            };
            let name = profile.attr("name").map(Attr::into_value).unwrap_or(Value::Null);
            Ok(name.as_str().map(str::to_uppercase).into())
        })
        .unwrap();
    let ds = build(&mapping, &members(), &FormatOptions::default()).unwrap();
    assert_eq!(ds.rows()[0][0], Value::from("ADA LOVELACE"));
}

#[test]
fn test_missing_attribute_aborts_with_segment() {
    let mapping = ColumnMapping::new().path("Phone", "profile.phone").unwrap();
    let err = build(&mapping, &members(), &FormatOptions::default()).unwrap_err();
    match err {
        ExportError::MissingAttribute { path, segment } => {
            assert_eq!(path, "profile.phone");
            assert_eq!(segment, "phone");
        }
        other => panic!("unexpected: {other}"),
    }
}

#[test]
fn test_missing_attribute_with_default_fills_cell() {
    let mapping = ColumnMapping::new().path_or("Phone", "profile.phone", "n/a").unwrap();
    let ds = build(&mapping, &members(), &FormatOptions::default()).unwrap();
    assert!(ds.rows().iter().all(|r| r[0] == Value::from("n/a")));
}

#[test]
fn test_json_records_resolve_like_bson() {
    let rows = vec![
        serde_json::json!({"profile": {"name": "Ada", "score": 0}}),
        serde_json::json!({"profile": {"name": "Brian", "score": null}}),
    ];
    let mapping = ColumnMapping::from_paths([("Name", "profile.name"), ("Score", "profile.score")]).unwrap();
    let ds = build(&mapping, &rows, &FormatOptions::default()).unwrap();
    assert_eq!(ds.to_csv().unwrap(), "Name,Score\nAda,0\nBrian,\n");
}

#[test]
fn test_json_large_unsigned_ids_render_exactly() {
    let rows = vec![serde_json::json!({"id": u64::MAX})];
    let mapping = ColumnMapping::from_paths([("Id", "id")]).unwrap();
    let ds = build(&mapping, &rows, &FormatOptions::default()).unwrap();
    assert_eq!(ds.to_csv().unwrap(), "Id\n18446744073709551615\n");
}

#[test]
fn test_named_zone_follows_daylight_saving() {
    let rows = vec![
        bson::doc! {"at": bson::DateTime::from_millis(1_672_954_200_000)},
        bson::doc! {"at": bson::DateTime::from_millis(1_688_592_600_000)},
    ];
    let opts = FormatOptions {
        timezone: "America/New_York".parse::<DisplayTimezone>().unwrap(),
        ..FormatOptions::default()
    };
    let mapping = ColumnMapping::from_paths([("At", "at")]).unwrap();
    let ds = build(&mapping, &rows, &opts).unwrap();
    assert_eq!(ds.to_csv().unwrap(), "At\n01/05/2023 16:30\n07/05/2023 17:30\n");
}
