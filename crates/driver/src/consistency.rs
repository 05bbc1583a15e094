use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ConsistencyLevel {
    Any,
    #[default]
    One,
    Two,
    Three,
    Quorum,
    All,
    LocalQuorum,
    EachQuorum,
    Serial,
    LocalSerial,
    LocalOne,
}

lazy_static! {
    static ref CONSISTENCY_MAP: HashMap<&'static str, ConsistencyLevel> = {
        let mut m = HashMap::new();
        m.insert("ANY", ConsistencyLevel::Any);
        m.insert("ONE", ConsistencyLevel::One);
        m.insert("TWO", ConsistencyLevel::Two);
        m.insert("THREE", ConsistencyLevel::Three);
        m.insert("QUORUM", ConsistencyLevel::Quorum);
        m.insert("ALL", ConsistencyLevel::All);
        m.insert("LOCAL_QUORUM", ConsistencyLevel::LocalQuorum);
        m.insert("EACH_QUORUM", ConsistencyLevel::EachQuorum);
        m.insert("SERIAL", ConsistencyLevel::Serial);
        m.insert("LOCAL_SERIAL", ConsistencyLevel::LocalSerial);
        m.insert("LOCAL_ONE", ConsistencyLevel::LocalOne);
        m
    };
}

impl ConsistencyLevel {
    pub fn name(&self) -> &'static str {
        match self {
            ConsistencyLevel::Any => "ANY",
            ConsistencyLevel::One => "ONE",
            ConsistencyLevel::Two => "TWO",
            ConsistencyLevel::Three => "THREE",
            ConsistencyLevel::Quorum => "QUORUM",
            ConsistencyLevel::All => "ALL",
            ConsistencyLevel::LocalQuorum => "LOCAL_QUORUM",
            ConsistencyLevel::EachQuorum => "EACH_QUORUM",
            ConsistencyLevel::Serial => "SERIAL",
            ConsistencyLevel::LocalSerial => "LOCAL_SERIAL",
            ConsistencyLevel::LocalOne => "LOCAL_ONE",
        }
    }

    /// Number of replicas that must answer out of `replicas` for a request
    /// at this level to succeed. Single data center, so local levels match
    /// their global counterparts.
    pub fn required_replicas(&self, replicas: usize) -> usize {
        let quorum = replicas / 2 + 1;
        match self {
            ConsistencyLevel::Any => 0,
            ConsistencyLevel::One | ConsistencyLevel::LocalOne => 1,
            ConsistencyLevel::Two => 2,
            ConsistencyLevel::Three => 3,
            ConsistencyLevel::Quorum
            | ConsistencyLevel::LocalQuorum
            | ConsistencyLevel::EachQuorum
            | ConsistencyLevel::Serial
            | ConsistencyLevel::LocalSerial => quorum,
            ConsistencyLevel::All => replicas,
        }
    }
}

impl FromStr for ConsistencyLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CONSISTENCY_MAP
            .get(s.trim().to_ascii_uppercase().as_str())
            .copied()
            .ok_or_else(|| format!("Unknown consistency level: {s}"))
    }
}

impl fmt::Display for ConsistencyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
