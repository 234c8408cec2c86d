// Estructuras de datos principales: cursos del catálogo, registros del
// timetable y contadores de la pasada de merge.

use crate::error::MergeError;
use serde::de::value::{MapAccessDeserializer, SeqAccessDeserializer};
use serde::de::{MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};
use std::ops::{Add, AddAssign};

/// Número de curso tal como viene en el JSON (`101`, `7.01`, ...).
///
/// La igualdad es numérica y exacta (`101 == 101.0`, pero dos enteros
/// distintos nunca coinciden aunque su `f64` sea el mismo). Se serializa
/// exactamente como se leyó para no reescribir el catálogo.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CourseNumber(Number);

/// Clave hasheable de un [`CourseNumber`], consistente con su `PartialEq`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumberKey {
    Integer(i128),
    Fractional(u64),
}

// 2^127: por debajo, un float entero cabe exacto en i128
const I128_FLOAT_LIMIT: f64 = 170141183460469231731687303715884105728.0;

impl CourseNumber {
    pub fn as_f64(&self) -> f64 {
        self.0.as_f64().unwrap_or(0.0)
    }

    pub fn key(&self) -> NumberKey {
        if let Some(u) = self.0.as_u64() {
            return NumberKey::Integer(u as i128);
        }
        if let Some(i) = self.0.as_i64() {
            return NumberKey::Integer(i as i128);
        }
        let v = self.as_f64();
        if v.fract() == 0.0 && v.abs() < I128_FLOAT_LIMIT {
            // -0.0 cae aquí como 0
            NumberKey::Integer(v as i128)
        } else {
            NumberKey::Fractional(v.to_bits())
        }
    }
}

impl PartialEq for CourseNumber {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl From<u64> for CourseNumber {
    fn from(n: u64) -> Self {
        CourseNumber(Number::from(n))
    }
}

impl TryFrom<f64> for CourseNumber {
    type Error = MergeError;

    fn try_from(n: f64) -> Result<Self, MergeError> {
        Number::from_f64(n)
            .map(CourseNumber)
            .ok_or(MergeError::NonFiniteNumber(n))
    }
}

impl std::fmt::Display for CourseNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Curso del catálogo. Los campos que el merge no toca (título, descripción,
/// medianas, ...) viajan en `extra` y se escriben de vuelta sin cambios.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub department: String,
    pub number: CourseNumber,
    #[serde(default)]
    pub periods: Option<Vec<String>>,
    #[serde(default)]
    pub offered: bool,
    #[serde(default)]
    pub terms_offered: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Course {
    pub fn new(department: &str, number: impl Into<CourseNumber>) -> Self {
        Course {
            department: department.to_string(),
            number: number.into(),
            periods: None,
            offered: false,
            terms_offered: None,
            extra: Map::new(),
        }
    }

    pub fn with_terms_offered(mut self, terms: &[&str]) -> Self {
        self.terms_offered = Some(terms.iter().map(|t| t.to_string()).collect());
        self
    }

    pub fn matches(&self, record: &TimetableRecord) -> bool {
        self.department == record.subj && self.number == record.num
    }
}

/// Una sección del timetable (subj/num/term/period). El resto de campos del
/// scraper (`crn`, `sec`, `instructors`, ...) se conservan en `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimetableRecord {
    pub subj: String,
    pub num: CourseNumber,
    pub term: i64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub period: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TimetableRecord {
    pub fn new(subj: &str, num: impl Into<CourseNumber>, term: i64, period: &str) -> Self {
        TimetableRecord {
            subj: subj.to_string(),
            num: num.into(),
            term,
            period: period.to_string(),
            extra: Map::new(),
        }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Documento de timetable: el sobre del scraper (`{"courses": [...], ...}`)
/// o un arreglo plano de registros.
///
/// Se despacha por la forma del JSON (objeto o arreglo) para que los errores
/// de un registro lleguen tal cual, con campo y posición.
#[derive(Debug, Clone)]
pub enum TimetableDocument {
    Envelope {
        courses: Vec<TimetableRecord>,
        total: Option<usize>,
        updated: Option<String>,
    },
    Records(Vec<TimetableRecord>),
}

#[derive(Deserialize)]
struct EnvelopeRepr {
    courses: Vec<TimetableRecord>,
    #[serde(default)]
    total: Option<usize>,
    #[serde(default)]
    updated: Option<String>,
}

impl<'de> Deserialize<'de> for TimetableDocument {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct DocumentVisitor;

        impl<'de> Visitor<'de> for DocumentVisitor {
            type Value = TimetableDocument;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("a timetable object with `courses` or an array of timetable records")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, seq: A) -> Result<Self::Value, A::Error> {
                let records = Vec::<TimetableRecord>::deserialize(SeqAccessDeserializer::new(seq))?;
                Ok(TimetableDocument::Records(records))
            }

            fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Self::Value, A::Error> {
                let env = EnvelopeRepr::deserialize(MapAccessDeserializer::new(map))?;
                Ok(TimetableDocument::Envelope { courses: env.courses, total: env.total, updated: env.updated })
            }
        }

        deserializer.deserialize_any(DocumentVisitor)
    }
}

impl TimetableDocument {
    pub fn into_records(self) -> Vec<TimetableRecord> {
        match self {
            TimetableDocument::Envelope { courses, .. } => courses,
            TimetableDocument::Records(records) => records,
        }
    }

    pub fn updated(&self) -> Option<&str> {
        match self {
            TimetableDocument::Envelope { updated, .. } => updated.as_deref(),
            TimetableDocument::Records(_) => None,
        }
    }
}

/// Contadores de la pasada. Se devuelven explícitamente y se suman al
/// reducir particiones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeCounters {
    pub new_sections: usize,
    pub new_courses: usize,
    pub winter_patch: usize,
}

impl Add for MergeCounters {
    type Output = MergeCounters;

    fn add(self, rhs: MergeCounters) -> MergeCounters {
        MergeCounters {
            new_sections: self.new_sections + rhs.new_sections,
            new_courses: self.new_courses + rhs.new_courses,
            winter_patch: self.winter_patch + rhs.winter_patch,
        }
    }
}

impl AddAssign for MergeCounters {
    fn add_assign(&mut self, rhs: MergeCounters) {
        *self = *self + rhs;
    }
}

impl std::iter::Sum for MergeCounters {
    fn sum<I: Iterator<Item = MergeCounters>>(iter: I) -> Self {
        iter.fold(MergeCounters::default(), Add::add)
    }
}
