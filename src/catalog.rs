//! Algorithm catalog: display names, plot styles and comparison groups.
//!
//! Every (meta-algorithm, algorithm) combination gets a [`Binding`] built
//! once from fixed style tables. A combination whose algorithm lacks a dash
//! pattern or marker, or whose meta-algorithm lacks a colour, is logged and
//! left out; looking it up later returns `None`.

use log::warn;
use std::collections::BTreeMap;
use std::fmt;

/// Leaf algorithms known to the benchmark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Algorithm {
    Spea2,
    Nsga2,
    Nsga3,
    Ibea,
    Omopso,
    Smsemoa,
    Jgbl,
    Nsls,
}

impl Algorithm {
    pub const ALL: [Algorithm; 8] = [
        Algorithm::Spea2,
        Algorithm::Nsga2,
        Algorithm::Nsga3,
        Algorithm::Ibea,
        Algorithm::Omopso,
        Algorithm::Smsemoa,
        Algorithm::Jgbl,
        Algorithm::Nsls,
    ];

    /// Presentation order in legends and summaries.
    pub const DISPLAY_ORDER: [Algorithm; 8] = [
        Algorithm::Nsga2,
        Algorithm::Ibea,
        Algorithm::Omopso,
        Algorithm::Nsga3,
        Algorithm::Jgbl,
        Algorithm::Nsls,
        Algorithm::Spea2,
        Algorithm::Smsemoa,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Spea2 => "SPEA2",
            Algorithm::Nsga2 => "NSGAII",
            Algorithm::Nsga3 => "NSGAIII",
            Algorithm::Ibea => "IBEA",
            Algorithm::Omopso => "OMOPSO",
            Algorithm::Smsemoa => "SMSEMOA",
            Algorithm::Jgbl => "JGBL",
            Algorithm::Nsls => "NSLS",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.name() == name)
    }

    /// Dash pattern (on/off lengths); empty means a solid line.
    fn dashes(self) -> Option<&'static [u32]> {
        match self {
            Algorithm::Spea2 | Algorithm::Nsga2 => Some(&[]),
            Algorithm::Nsga3 => Some(&[5, 2]),
            Algorithm::Ibea => Some(&[2, 2]),
            Algorithm::Omopso => Some(&[10, 2, 5, 2]),
            Algorithm::Jgbl => Some(&[2, 10]),
            Algorithm::Nsls => Some(&[4, 30]),
            Algorithm::Smsemoa => None,
        }
    }

    fn marker(self) -> Option<char> {
        match self {
            Algorithm::Spea2 => Some('o'),
            Algorithm::Nsga2 => Some('*'),
            Algorithm::Ibea => Some('^'),
            Algorithm::Omopso => Some('>'),
            Algorithm::Nsga3 => Some('v'),
            Algorithm::Jgbl => Some('<'),
            Algorithm::Nsls => Some('x'),
            Algorithm::Smsemoa => None,
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Meta-algorithms wrapping a leaf algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MetaAlgorithm {
    /// The leaf algorithm on its own.
    Bare,
    Imga,
    Hgs,
    Dhgs,
}

impl MetaAlgorithm {
    pub const ALL: [MetaAlgorithm; 4] = [
        MetaAlgorithm::Bare,
        MetaAlgorithm::Imga,
        MetaAlgorithm::Hgs,
        MetaAlgorithm::Dhgs,
    ];

    pub fn name(self) -> &'static str {
        match self {
            MetaAlgorithm::Bare => "BARE",
            MetaAlgorithm::Imga => "IMGA",
            MetaAlgorithm::Hgs => "HGS",
            MetaAlgorithm::Dhgs => "DHGS",
        }
    }

    /// Line colour: a grey level in `[0, 1]` or a colour code.
    fn colour(self) -> Option<&'static str> {
        match self {
            MetaAlgorithm::Bare => Some("0.8"),
            MetaAlgorithm::Imga => Some("0.4"),
            MetaAlgorithm::Hgs => Some("0.0"),
            MetaAlgorithm::Dhgs => Some("r"),
        }
    }

    /// `"NSGAII"` for bare runs, `"IMGA+NSGAII"` otherwise.
    pub fn display_name(self, algorithm: Algorithm) -> String {
        match self {
            MetaAlgorithm::Bare => algorithm.name().to_string(),
            meta => format!("{}+{}", meta.name(), algorithm.name()),
        }
    }
}

impl fmt::Display for MetaAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How series are split into comparison groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GroupLayout {
    /// One group, `""`, holding everything.
    #[default]
    AllTogether,
    /// Pairwise groups of bare, IMGA and HGS variants: `"0"`, `"1"`, `"2"`.
    Split,
    /// One group per leaf algorithm, e.g. `"_nsgaii"`, holding its bare,
    /// IMGA and HGS variants.
    PerAlgorithm,
}

impl GroupLayout {
    fn groups(self, meta: MetaAlgorithm, algorithm: Algorithm) -> Vec<String> {
        match (self, meta) {
            (GroupLayout::AllTogether, _) => vec![String::new()],
            (GroupLayout::Split, MetaAlgorithm::Bare) => vec!["0".into(), "1".into()],
            (GroupLayout::Split, MetaAlgorithm::Imga) => vec!["0".into(), "2".into()],
            (GroupLayout::Split, MetaAlgorithm::Hgs) => vec!["1".into(), "2".into()],
            (
                GroupLayout::PerAlgorithm,
                MetaAlgorithm::Bare | MetaAlgorithm::Imga | MetaAlgorithm::Hgs,
            ) => {
                vec![format!("_{}", algorithm.name().to_lowercase())]
            }
            (_, MetaAlgorithm::Dhgs) => Vec::new(),
        }
    }
}

/// Presentation and grouping data of one algorithm name.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Binding {
    pub display_name: String,
    pub meta: MetaAlgorithm,
    pub algorithm: Algorithm,
    pub dashes: Vec<u32>,
    pub marker: char,
    pub colour: String,
    /// Comparison groups the series of this algorithm is added to.
    pub groups: Vec<String>,
}

/// Name → [`Binding`] lookup, built once.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    bindings: BTreeMap<String, Binding>,
}

impl Catalog {
    /// All combinations, grouped together.
    pub fn standard() -> Self {
        Self::with_layout(GroupLayout::AllTogether)
    }

    pub fn with_layout(layout: GroupLayout) -> Self {
        let mut bindings = BTreeMap::new();
        for meta in MetaAlgorithm::ALL {
            for algorithm in Algorithm::ALL {
                let (Some(dashes), Some(marker), Some(colour)) =
                    (algorithm.dashes(), algorithm.marker(), meta.colour())
                else {
                    warn!("missing plot style binding for {meta}, {algorithm}");
                    continue;
                };
                let display_name = meta.display_name(algorithm);
                bindings.insert(
                    display_name.clone(),
                    Binding {
                        display_name,
                        meta,
                        algorithm,
                        dashes: dashes.to_vec(),
                        marker,
                        colour: colour.to_string(),
                        groups: layout.groups(meta, algorithm),
                    },
                );
            }
        }
        Self { bindings }
    }

    /// Adds or replaces a binding under its display name.
    pub fn insert(&mut self, binding: Binding) {
        self.bindings.insert(binding.display_name.clone(), binding);
    }

    pub fn lookup(&self, name: &str) -> Option<&Binding> {
        self.bindings.get(name)
    }

    /// Groups of `name`, or `None` when it has no binding.
    pub fn groups(&self, name: &str) -> Option<&[String]> {
        self.lookup(name).map(|b| b.groups.as_slice())
    }

    /// Bindings in presentation order: by meta-algorithm, then by
    /// [`Algorithm::DISPLAY_ORDER`]. Custom bindings come last.
    pub fn ordered(&self) -> Vec<&Binding> {
        let rank = |b: &Binding| {
            let algo = Algorithm::DISPLAY_ORDER
                .iter()
                .position(|&a| a == b.algorithm)
                .unwrap_or(usize::MAX);
            (b.meta, algo)
        };
        let mut out: Vec<&Binding> = self.bindings.values().collect();
        out.sort_by_key(|&b| rank(b));
        out
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
