use roxmltree::Node;

use super::{error::XsdError, mapping_context::line_of};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MaxOccurs {
    Unbounded,
    Count(u64),
}

/// How many values an element field holds once resolved.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Cardinality {
    Single,
    Many,
}

/// The `minOccurs`/`maxOccurs` pair of an element particle.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Occurrence {
    pub min_occurs: u64,
    pub max_occurs: MaxOccurs,
}

impl Default for Occurrence {
    fn default() -> Self {
        Self {
            min_occurs: 1,
            max_occurs: MaxOccurs::Count(1),
        }
    }
}

impl Occurrence {
    pub(super) fn map_from_xml(node: Node) -> Result<Self, XsdError> {
        let invalid = |attribute, value: &str| XsdError::InvalidValue {
            attribute,
            value: value.into(),
            line: line_of(node),
        };

        let min_occurs = match node.attribute("minOccurs") {
            Some(value) => value
                .trim()
                .parse::<u64>()
                .map_err(|_| invalid("minOccurs", value))?,
            None => 1,
        };
        let max_occurs = match node.attribute("maxOccurs").map(str::trim) {
            Some("unbounded") => MaxOccurs::Unbounded,
            Some(value) => MaxOccurs::Count(
                value
                    .parse::<u64>()
                    .map_err(|_| invalid("maxOccurs", value))?,
            ),
            None => MaxOccurs::Count(1),
        };

        Ok(Self {
            min_occurs,
            max_occurs,
        })
    }

    pub fn cardinality(&self) -> Cardinality {
        match self.max_occurs {
            MaxOccurs::Count(0 | 1) => Cardinality::Single,
            _ => Cardinality::Many,
        }
    }

    pub fn is_required(&self) -> bool {
        self.min_occurs >= 1
    }
}
