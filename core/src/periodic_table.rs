use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Chemical elements up to argon. The discriminant is the atomic number.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
#[repr(u32)]
pub enum ElementType {
    H = 1,
    He,
    Li,
    Be,
    B,
    C,
    N,
    O,
    F,
    Ne,
    Na,
    Mg,
    Al,
    Si,
    P,
    S,
    Cl,
    Ar,
}

const ELEMENTS: [ElementType; 18] = [
    ElementType::H,
    ElementType::He,
    ElementType::Li,
    ElementType::Be,
    ElementType::B,
    ElementType::C,
    ElementType::N,
    ElementType::O,
    ElementType::F,
    ElementType::Ne,
    ElementType::Na,
    ElementType::Mg,
    ElementType::Al,
    ElementType::Si,
    ElementType::P,
    ElementType::S,
    ElementType::Cl,
    ElementType::Ar,
];

impl ElementType {
    pub fn atomic_number(self) -> u32 {
        self as u32
    }

    pub fn from_atomic_number(number: u32) -> Option<Self> {
        ELEMENTS.get((number as usize).checked_sub(1)?).copied()
    }

    pub fn symbol(self) -> &'static str {
        match self {
            ElementType::H => "H",
            ElementType::He => "He",
            ElementType::Li => "Li",
            ElementType::Be => "Be",
            ElementType::B => "B",
            ElementType::C => "C",
            ElementType::N => "N",
            ElementType::O => "O",
            ElementType::F => "F",
            ElementType::Ne => "Ne",
            ElementType::Na => "Na",
            ElementType::Mg => "Mg",
            ElementType::Al => "Al",
            ElementType::Si => "Si",
            ElementType::P => "P",
            ElementType::S => "S",
            ElementType::Cl => "Cl",
            ElementType::Ar => "Ar",
        }
    }
}

impl FromStr for ElementType {
    type Err = Error;

    /// Accepts element symbols (case insensitive) as well as atomic numbers, which is how
    /// Basis Set Exchange files key their elements.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();

        if let Ok(number) = trimmed.parse::<u32>() {
            return Self::from_atomic_number(number)
                .ok_or_else(|| Error::UnknownElement(s.to_owned()));
        }

        ELEMENTS
            .iter()
            .copied()
            .find(|element| element.symbol().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| Error::UnknownElement(s.to_owned()))
    }
}

impl TryFrom<String> for ElementType {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ElementType> for String {
    fn from(value: ElementType) -> Self {
        value.symbol().to_owned()
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
