//! C2: `Datum`, a type-preserving representation of primary-key values.
//!
//! Two datums are comparable iff they share a type tag; comparison must
//! agree with MySQL's byte-wise `ORDER BY` on the corresponding column,
//! which is why only signed integers, unsigned integers and binary strings
//! are supported.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use crate::error::{OscError, OscResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DatumKind {
    Signed,
    Unsigned,
    Binary,
}

impl fmt::Display for DatumKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DatumKind::Signed => "signed",
            DatumKind::Unsigned => "unsigned",
            DatumKind::Binary => "binary",
        };
        write!(f, "{s}")
    }
}

/// A primary-key value of one of three simplified types. `Nil` values
/// (produced by `min_value()`/`max_value()`'s open-ended counterpart, or by
/// a freshly-opened chunker) compare as the extreme for their type but are
/// never emitted in a persisted chunk boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Datum {
    Signed(i64),
    Unsigned(u64),
    Binary(Vec<u8>),
    /// Not a real value; used as the chunk pointer before any row has been
    /// read. `is_nil()` is true only for this variant.
    Nil(DatumKind),
}

impl Datum {
    pub fn kind(&self) -> DatumKind {
        match self {
            Datum::Signed(_) => DatumKind::Signed,
            Datum::Unsigned(_) => DatumKind::Unsigned,
            Datum::Binary(_) => DatumKind::Binary,
            Datum::Nil(k) => *k,
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Datum::Nil(_))
    }

    pub fn nil(kind: DatumKind) -> Self {
        Datum::Nil(kind)
    }

    pub fn min_value(&self) -> Datum {
        match self.kind() {
            DatumKind::Signed => Datum::Signed(i64::MIN),
            DatumKind::Unsigned => Datum::Unsigned(u64::MIN),
            DatumKind::Binary => Datum::Binary(Vec::new()),
        }
    }

    pub fn max_value(&self) -> Datum {
        match self.kind() {
            DatumKind::Signed => Datum::Signed(i64::MAX),
            DatumKind::Unsigned => Datum::Unsigned(u64::MAX),
            DatumKind::Binary => Datum::Binary(vec![0xFF; 255]),
        }
    }

    /// `self + n`, saturating at the type's max. Used to advance the
    /// optimistic chunker's pointer by `chunk_size`.
    pub fn add(&self, n: u64) -> Datum {
        match self {
            Datum::Signed(v) => Datum::Signed(v.saturating_add(n as i64)),
            Datum::Unsigned(v) => Datum::Unsigned(v.saturating_add(n)),
            Datum::Binary(_) => panic!("Datum::add is not defined for binary keys"),
            Datum::Nil(_) => panic!("Datum::add called on a nil datum, call min_value() first"),
        }
    }

    /// The number of discrete values between `self` and `other`, used for
    /// the composite chunker's "disable prefetching" heuristic. Binary keys
    /// have no meaningful distance, so this treats them as maximally far
    /// apart unless equal.
    pub fn range(&self, other: &Datum) -> i128 {
        match (self, other) {
            (Datum::Signed(a), Datum::Signed(b)) => *a as i128 - *b as i128,
            (Datum::Unsigned(a), Datum::Unsigned(b)) => *a as i128 - *b as i128,
            (Datum::Binary(a), Datum::Binary(b)) => {
                if a == b { 0 } else { i128::MAX }
            }
            _ => panic!("Datum::range requires matching kinds"),
        }
    }

    pub fn greater_than_or_equal(&self, other: &Datum) -> bool {
        self.partial_cmp(other).map(|o| o != Ordering::Less).unwrap_or(false)
    }

    /// Renders the value as a SQL literal suitable for a predicate or
    /// prefetch probe. Binary values are hex-escaped; signed/unsigned
    /// integers need no quoting.
    pub fn to_sql_literal(&self) -> String {
        match self {
            Datum::Signed(v) => v.to_string(),
            Datum::Unsigned(v) => v.to_string(),
            Datum::Binary(v) => format!("x'{}'", hex_encode(v)),
            Datum::Nil(_) => panic!("Datum::to_sql_literal called on a nil datum"),
        }
    }

    fn assert_comparable(&self, other: &Datum) {
        assert_eq!(
            self.kind(),
            other.kind(),
            "datums of different kinds are not comparable: {:?} vs {:?}",
            self.kind(),
            other.kind()
        );
    }
}

impl PartialEq for Datum {
    fn eq(&self, other: &Self) -> bool {
        self.assert_comparable(other);
        match (self, other) {
            (Datum::Signed(a), Datum::Signed(b)) => a == b,
            (Datum::Unsigned(a), Datum::Unsigned(b)) => a == b,
            (Datum::Binary(a), Datum::Binary(b)) => a == b,
            (Datum::Nil(_), Datum::Nil(_)) => true,
            _ => false,
        }
    }
}

impl Eq for Datum {}

impl PartialOrd for Datum {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.assert_comparable(other);
        Some(match (self, other) {
            (Datum::Signed(a), Datum::Signed(b)) => a.cmp(b),
            (Datum::Unsigned(a), Datum::Unsigned(b)) => a.cmp(b),
            (Datum::Binary(a), Datum::Binary(b)) => a.cmp(b),
            (Datum::Nil(_), Datum::Nil(_)) => Ordering::Equal,
            (Datum::Nil(_), _) => Ordering::Less,
            (_, Datum::Nil(_)) => Ordering::Greater,
        })
    }
}

impl Ord for Datum {
    fn cmp(&self, other: &Self) -> Ordering {
        self.partial_cmp(other).expect("comparable datums")
    }
}

impl fmt::Display for Datum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Datum::Signed(v) => write!(f, "{v}"),
            Datum::Unsigned(v) => write!(f, "{v}"),
            Datum::Binary(v) => write!(f, "'{}'", String::from_utf8_lossy(v)),
            Datum::Nil(_) => write!(f, "NULL"),
        }
    }
}

/// Parses a raw SQL-rendered value (as returned by `Row::get` or a prefetch
/// probe) into a `Datum` of the given kind.
pub fn parse_datum(raw: &str, kind: DatumKind) -> OscResult<Datum> {
    match kind {
        DatumKind::Signed => raw
            .parse::<i64>()
            .map(Datum::Signed)
            .map_err(|_| OscError::Consistency(format!("expected a signed integer key value, got: {raw}"))),
        DatumKind::Unsigned => raw
            .parse::<u64>()
            .map(Datum::Unsigned)
            .map_err(|_| OscError::Consistency(format!("expected an unsigned integer key value, got: {raw}"))),
        DatumKind::Binary => Ok(Datum::Binary(raw.as_bytes().to_vec())),
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Maps a MySQL `COLUMN_TYPE` string (as returned by
/// `information_schema.columns`) to a simplified, binary-comparable key
/// type, or `None` if the type can't be safely chunked/keyed.
pub fn mysql_type_to_datum_kind(column_type: &str) -> Option<DatumKind> {
    let t = column_type.to_ascii_lowercase();
    let t = t.split(['(', ' ']).next().unwrap_or(&t);
    let unsigned = column_type.to_ascii_lowercase().contains("unsigned");
    match t {
        "tinyint" | "smallint" | "mediumint" | "int" | "bigint" => {
            Some(if unsigned { DatumKind::Unsigned } else { DatumKind::Signed })
        }
        // binary/varbinary is byte-comparable; char/varchar is only
        // byte-comparable under a binary collation, which the caller must
        // verify separately (TableInfo::check_primary_key_is_binary_comparable).
        "binary" | "varbinary" => Some(DatumKind::Binary),
        "char" | "varchar" => Some(DatumKind::Binary),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_within_kind() {
        assert!(Datum::Signed(1) < Datum::Signed(2));
        assert!(Datum::Unsigned(5) >= Datum::Unsigned(5));
        assert!(Datum::Binary(b"a".to_vec()) < Datum::Binary(b"b".to_vec()));
    }

    #[test]
    #[should_panic]
    fn cross_kind_comparison_panics() {
        let _ = Datum::Signed(1) < Datum::Unsigned(1);
    }

    #[test]
    fn nil_is_extreme() {
        let nil = Datum::nil(DatumKind::Signed);
        assert!(nil.is_nil());
        assert!(nil < Datum::Signed(i64::MIN));
    }

    #[test]
    fn add_saturates() {
        assert_eq!(Datum::Signed(i64::MAX - 1).add(10), Datum::Signed(i64::MAX));
    }

    #[test]
    fn type_mapping() {
        assert_eq!(mysql_type_to_datum_kind("int(11)"), Some(DatumKind::Signed));
        assert_eq!(mysql_type_to_datum_kind("int(11) unsigned"), Some(DatumKind::Unsigned));
        assert_eq!(mysql_type_to_datum_kind("varbinary(16)"), Some(DatumKind::Binary));
        assert_eq!(mysql_type_to_datum_kind("float"), None);
    }
}
