//! Column-name driven generators backed by the `fake` crate.
//!
//! Each call seeds a fresh `StdRng` from the context stream so values stay
//! reproducible for a given seed.

use super::Generator;
use crate::context::GenerationContext;
use crate::error::GenerationError;
use crate::schema::TypeFamily;
use crate::value::Value;
use chrono::Duration;
use fake::faker::address::en::{BuildingNumber, CityName, CountryName, StreetName, ZipCode};
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::{FirstName, LastName, Name};
use fake::faker::phone_number::en::PhoneNumber;
use fake::Fake;
use rand::Rng;

const DAY: i64 = 24 * 60 * 60;

/// Real-world meaning inferred from a column name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SemanticKind {
    Email,
    Phone,
    FirstName,
    LastName,
    FullName,
    Address,
    City,
    Country,
    PostalCode,
    CreatedAt,
    UpdatedAt,
}

impl SemanticKind {
    pub const ALL: [SemanticKind; 11] = [
        SemanticKind::Email,
        SemanticKind::Phone,
        SemanticKind::FirstName,
        SemanticKind::LastName,
        SemanticKind::FullName,
        SemanticKind::Address,
        SemanticKind::City,
        SemanticKind::Country,
        SemanticKind::PostalCode,
        SemanticKind::CreatedAt,
        SemanticKind::UpdatedAt,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SemanticKind::Email => "email",
            SemanticKind::Phone => "phone",
            SemanticKind::FirstName => "first_name",
            SemanticKind::LastName => "last_name",
            SemanticKind::FullName => "full_name",
            SemanticKind::Address => "address",
            SemanticKind::City => "city",
            SemanticKind::Country => "country",
            SemanticKind::PostalCode => "postal_code",
            SemanticKind::CreatedAt => "created_at",
            SemanticKind::UpdatedAt => "updated_at",
        }
    }

    /// Whether values of this kind fit a column of `family`.
    pub fn applies_to(self, family: TypeFamily) -> bool {
        match self {
            SemanticKind::CreatedAt | SemanticKind::UpdatedAt => {
                matches!(family, TypeFamily::Character | TypeFamily::DateTime)
            }
            _ => family == TypeFamily::Character,
        }
    }
}

fn is_first_name(name: &str) -> bool {
    name.contains("first_name") || name.contains("firstname") || name == "fname"
}

fn is_last_name(name: &str) -> bool {
    name.contains("last_name")
        || name.contains("lastname")
        || name.contains("surname")
        || name == "lname"
}

fn is_city(name: &str) -> bool {
    name.contains("city")
}

fn is_country(name: &str) -> bool {
    name.contains("country")
}

fn is_postal_code(name: &str) -> bool {
    name.contains("postal") || name.contains("zip")
}

/// Infer a semantic kind from a column name (case-insensitive).
pub fn detect_semantic(column_name: &str) -> Option<SemanticKind> {
    let name = column_name.to_lowercase();

    if name.contains("email") {
        return Some(SemanticKind::Email);
    }
    if name.contains("phone") {
        return Some(SemanticKind::Phone);
    }
    if is_first_name(&name) {
        return Some(SemanticKind::FirstName);
    }
    if is_last_name(&name) {
        return Some(SemanticKind::LastName);
    }
    if name == "name" || name == "full_name" {
        return Some(SemanticKind::FullName);
    }
    if is_city(&name) {
        return Some(SemanticKind::City);
    }
    if is_country(&name) {
        return Some(SemanticKind::Country);
    }
    if is_postal_code(&name) {
        return Some(SemanticKind::PostalCode);
    }
    if name.contains("address") {
        return Some(SemanticKind::Address);
    }
    if name.contains("created") && !name.contains("updated") {
        return Some(SemanticKind::CreatedAt);
    }
    if name.contains("updated") || name.contains("modified") {
        return Some(SemanticKind::UpdatedAt);
    }
    None
}

/// Generator for one [`SemanticKind`]
#[derive(Debug, Clone, Copy)]
pub struct SemanticGenerator {
    kind: SemanticKind,
}

impl SemanticGenerator {
    pub fn new(kind: SemanticKind) -> Self {
        Self { kind }
    }

    pub fn kind(&self) -> SemanticKind {
        self.kind
    }
}

impl Generator for SemanticGenerator {
    fn generate(&self, ctx: &mut GenerationContext) -> Result<Value, GenerationError> {
        let reference = ctx.reference_time();
        let mut rng = ctx.seeded_rng();

        let text: String = match self.kind {
            SemanticKind::Email => SafeEmail().fake_with_rng(&mut rng),
            SemanticKind::Phone => PhoneNumber().fake_with_rng(&mut rng),
            SemanticKind::FirstName => FirstName().fake_with_rng(&mut rng),
            SemanticKind::LastName => LastName().fake_with_rng(&mut rng),
            SemanticKind::FullName => Name().fake_with_rng(&mut rng),
            SemanticKind::Address => {
                let number: String = BuildingNumber().fake_with_rng(&mut rng);
                let street: String = StreetName().fake_with_rng(&mut rng);
                format!("{} {}", number, street)
            }
            SemanticKind::City => CityName().fake_with_rng(&mut rng),
            SemanticKind::Country => CountryName().fake_with_rng(&mut rng),
            SemanticKind::PostalCode => ZipCode().fake_with_rng(&mut rng),
            SemanticKind::CreatedAt => {
                // between two years and thirty days ago
                let offset = rng.random_range(30 * DAY..2 * 365 * DAY);
                return Ok(Value::Timestamp(reference - Duration::seconds(offset)));
            }
            SemanticKind::UpdatedAt => {
                let offset = rng.random_range(0..30 * DAY);
                return Ok(Value::Timestamp(reference - Duration::seconds(offset)));
            }
        };
        Ok(Value::Text(text))
    }

    fn name(&self) -> &str {
        self.kind.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_common_names() {
        let cases = [
            ("email", Some(SemanticKind::Email)),
            ("Contact_Email", Some(SemanticKind::Email)),
            ("email_address", Some(SemanticKind::Email)),
            ("phone_number", Some(SemanticKind::Phone)),
            ("first_name", Some(SemanticKind::FirstName)),
            ("LastName", Some(SemanticKind::LastName)),
            ("name", Some(SemanticKind::FullName)),
            ("full_name", Some(SemanticKind::FullName)),
            ("billing_address", Some(SemanticKind::Address)),
            ("address_city", Some(SemanticKind::City)),
            ("country_code", Some(SemanticKind::Country)),
            ("zip", Some(SemanticKind::PostalCode)),
            ("created_at", Some(SemanticKind::CreatedAt)),
            ("updated_at", Some(SemanticKind::UpdatedAt)),
            ("last_modified", Some(SemanticKind::UpdatedAt)),
            ("modified_on", Some(SemanticKind::UpdatedAt)),
            ("created_or_updated", Some(SemanticKind::UpdatedAt)),
            ("product_name", None),
            ("quantity", None),
        ];
        for (name, expected) in cases {
            assert_eq!(detect_semantic(name), expected, "column {}", name);
        }
    }

    #[test]
    fn test_applies_only_to_matching_families() {
        assert!(SemanticKind::Email.applies_to(TypeFamily::Character));
        assert!(!SemanticKind::Email.applies_to(TypeFamily::Integer));
        assert!(SemanticKind::CreatedAt.applies_to(TypeFamily::DateTime));
        assert!(!SemanticKind::City.applies_to(TypeFamily::DateTime));
    }

    #[test]
    fn test_email_contains_at_sign() {
        let mut ctx = GenerationContext::for_table(42, "users");
        let gen = SemanticGenerator::new(SemanticKind::Email);
        for _ in 0..50 {
            let v = gen.generate(&mut ctx).unwrap();
            assert!(v.as_str().unwrap().contains('@'));
        }
    }

    #[test]
    fn test_semantic_values_are_deterministic() {
        let gen = SemanticGenerator::new(SemanticKind::FullName);
        let mut a = GenerationContext::for_table(7, "people");
        let mut b = GenerationContext::for_table(7, "people");
        for _ in 0..10 {
            assert_eq!(gen.generate(&mut a).unwrap(), gen.generate(&mut b).unwrap());
        }
    }

    #[test]
    fn test_updated_at_is_recent() {
        let mut ctx = GenerationContext::new(3);
        let reference = ctx.reference_time();
        let gen = SemanticGenerator::new(SemanticKind::UpdatedAt);
        for _ in 0..50 {
            match gen.generate(&mut ctx).unwrap() {
                Value::Timestamp(ts) => {
                    assert!(ts <= reference && ts > reference - Duration::days(30))
                }
                other => panic!("expected timestamp, got {:?}", other),
            }
        }
    }
}
