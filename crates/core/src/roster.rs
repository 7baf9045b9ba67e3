use crate::error::ConfigError;
use crate::utils::normalize_handle;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Accounts tracked in production
pub const PRODUCTION_HANDLES: &[&str] = &[
    "emiladrisse", "emilaphonia", "emilaphyssa", "emilaphyxia", "emilarentha",
    "emilarionda", "emilarionth", "emilarionyx", "emilarithia", "emilarthesia",
    "emilarthona", "emilaryaeth", "emilasteria", "emilastriva", "emilathione",
    "emilavareth", "emilavarethra", "emilavessiaz", "emilavessra", "emilavindra",
    "emilavionae", "emilavostra", "emilaxireth", "emilaylaraz", "emilayrissa", "emilayzora",
    "emilazaireth", "emilazareen", "emilazauria", "emilazavyn", "emilazelyra",
    "emilazentha", "emilazenthe", "emilazenthae", "emilazenya", "emilazetra", "emilaziona",
    "emilazionyx", "emilazirexa", "emilaznara", "emilazoniah", "emilazrya", "emilazrynna",
    "emilazythra", "emilenthessa", "emilenthira", "emilestine", "emilethoria",
    "emileveraith", "emilevontra", "emilevorae", "emilevura", "emilezariah", "emilezethra",
    "emilindrya", "emilionthra", "emiliorixa", "emilistraen", "emilithyana", "emilixarya",
    "emilixurina", "emilondara", "emilondraxa", "emilonexra", "emilorenxia", "emiloresta",
    "emilorexia", "emiloryllia", "emiloryneth", "emilorynxa", "emilourithia",
    "emilovandria", "emilovaxa", "emilovendra", "emilovessra", "emilovetha", "emilozanna",
    "emilozuria", "emiltharion", "emilundraeth", "emilunessa", "emilunethra", "emilunetra",
    "emilurayna", "emilurellia", "emilurethia", "emilurithae", "emiluryona", "emilustraxa",
    "emiluvetha", "emilazarethra", "emilazirion", "emilazuvara", "emilazyrel",
];

/// Number of production handles used by a testing run
const TESTING_SIZE: usize = 3;

/// Ordered, duplicate-free list of handles to process
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Roster {
    handles: Vec<String>,
}

impl Roster {
    /// Builds a roster, normalizing entries, dropping blanks and keeping
    /// the first occurrence of duplicates
    pub fn from_handles<I, S>(handles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let handles = handles
            .into_iter()
            .map(|h| normalize_handle(h.as_ref()))
            .filter(|h| !h.is_empty())
            .filter(|h| seen.insert(h.clone()))
            .collect();
        Self { handles }
    }

    pub fn production() -> Self {
        Self::from_handles(PRODUCTION_HANDLES.iter().copied())
    }

    pub fn testing() -> Self {
        Self::from_handles(PRODUCTION_HANDLES.iter().copied().take(TESTING_SIZE))
    }

    /// Parses one handle per line; blank lines and `#` comments are ignored
    pub fn parse(text: &str) -> Self {
        Self::from_handles(
            text.lines()
                .map(|line| line.split('#').next().unwrap_or_default())
                .filter(|line| !line.trim().is_empty()),
        )
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|e| ConfigError::Roster {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self::parse(&text))
    }

    pub fn handles(&self) -> &[String] {
        &self.handles
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}
