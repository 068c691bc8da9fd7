//! The logical tables of a release, their physical names and field counts.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Table {
    Rank,
    Atom,
    Definition,
    Hierarchy,
    Relation,
    Attribute,
    SemanticTypeDefinition,
    SemanticType,
}

impl Table {
    /// Dependency order. Every later table joins on state built by earlier ones.
    pub const ORDER: [Table; 8] = [
        Table::Rank,
        Table::Atom,
        Table::Definition,
        Table::Hierarchy,
        Table::Relation,
        Table::Attribute,
        Table::SemanticTypeDefinition,
        Table::SemanticType,
    ];

    /// Physical member name stem (`MRCONSO.RRF` also matches `MRCONSO.RRF.aa.gz`).
    pub fn stem(self) -> &'static str {
        match self {
            Table::Rank => "MRRANK.RRF",
            Table::Atom => "MRCONSO.RRF",
            Table::Definition => "MRDEF.RRF",
            Table::Hierarchy => "MRHIER.RRF",
            Table::Relation => "MRREL.RRF",
            Table::Attribute => "MRSAT.RRF",
            Table::SemanticTypeDefinition => "SRDEF",
            Table::SemanticType => "MRSTY.RRF",
        }
    }

    /// Number of `|`-separated fields per line, including the trailing empty one.
    pub fn field_count(self) -> usize {
        match self {
            Table::Rank => 5,
            Table::Atom => 19,
            Table::Definition => 9,
            Table::Hierarchy => 10,
            Table::Relation => 17,
            Table::Attribute => 14,
            Table::SemanticTypeDefinition => 11,
            Table::SemanticType => 7,
        }
    }

    /// Semantic-type tables are attached to unified concepts only.
    pub fn needs_unified_concepts(self) -> bool {
        matches!(self, Table::SemanticTypeDefinition | Table::SemanticType)
    }

    /// Does a physical member file name hold (a part of) this table?
    pub fn matches_member(self, file_name: &str) -> bool {
        let stem = self.stem();
        file_name == stem
            || file_name
                .strip_prefix(stem)
                .is_some_and(|rest| rest.starts_with('.'))
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Table::Rank => "rank",
            Table::Atom => "atom",
            Table::Definition => "definition",
            Table::Hierarchy => "hierarchy",
            Table::Relation => "relation",
            Table::Attribute => "attribute",
            Table::SemanticTypeDefinition => "semantic-type-definition",
            Table::SemanticType => "semantic-type",
        };
        f.write_str(name)
    }
}
