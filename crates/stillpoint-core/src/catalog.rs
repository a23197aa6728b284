//! Activity catalog: yoga sessions and breathing exercises.
//!
//! The engine only ever reads the catalog through [`CatalogAccessor`], so
//! tests can hand it a small fake while the CLI uses [`Catalog::builtin`]
//! or a TOML file:
//!
//! ```toml
//! [defaults]
//! morning = "morning-flow"
//! night = "breath-4-7-8"
//!
//! [[activity]]
//! id = "morning-flow"
//! name = "Morning Flow"
//! kind = "yoga"
//! duration_minutes = 20
//! time_tags = ["morning"]
//! ```

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, CoreError};
use crate::time_bucket::{TimeBucket, TimeTag};

/// Read-only view of the activity catalog.
pub trait CatalogAccessor {
    /// Resolve an activity id to its metadata.
    fn lookup(&self, activity_id: &str) -> Option<&ActivityMetadata>;

    /// Every activity in declaration order (yoga before breathing).
    fn list_all(&self) -> &[ActivityMetadata];

    /// The default activity id for a time bucket, if one is declared.
    fn default_activity_for(&self, bucket: TimeBucket) -> Option<&str>;

    /// Whether `activity_id` currently resolves.
    fn contains(&self, activity_id: &str) -> bool {
        self.lookup(activity_id).is_some()
    }
}

impl<T: CatalogAccessor + ?Sized> CatalogAccessor for &T {
    fn lookup(&self, activity_id: &str) -> Option<&ActivityMetadata> {
        (**self).lookup(activity_id)
    }

    fn list_all(&self) -> &[ActivityMetadata] {
        (**self).list_all()
    }

    fn default_activity_for(&self, bucket: TimeBucket) -> Option<&str> {
        (**self).default_activity_for(bucket)
    }
}

/// Kind of practice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Yoga,
    Breathing,
}

impl ActivityKind {
    pub fn label(self) -> &'static str {
        match self {
            ActivityKind::Yoga => "yoga",
            ActivityKind::Breathing => "breathing",
        }
    }
}

/// Static metadata for one catalog activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityMetadata {
    pub id: String,
    pub name: String,
    pub kind: ActivityKind,
    pub duration_minutes: u32,
    #[serde(default)]
    pub time_tags: BTreeSet<TimeTag>,
}

impl ActivityMetadata {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        kind: ActivityKind,
        duration_minutes: u32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            duration_minutes,
            time_tags: BTreeSet::new(),
        }
    }

    pub fn with_tags(mut self, tags: impl IntoIterator<Item = TimeTag>) -> Self {
        self.time_tags.extend(tags);
        self
    }
}

/// Per-bucket default activity ids as written in a catalog file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DefaultsTable {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub morning: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub midday: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub afternoon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evening: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub night: Option<String>,
}

impl DefaultsTable {
    fn slot(&mut self, bucket: TimeBucket) -> &mut Option<String> {
        match bucket {
            TimeBucket::Morning => &mut self.morning,
            TimeBucket::Midday => &mut self.midday,
            TimeBucket::Afternoon => &mut self.afternoon,
            TimeBucket::Evening => &mut self.evening,
            TimeBucket::Night => &mut self.night,
        }
    }

    fn into_map(mut self) -> BTreeMap<TimeBucket, String> {
        TimeBucket::ALL
            .into_iter()
            .filter_map(|bucket| self.slot(bucket).take().map(|id| (bucket, id)))
            .collect()
    }

    fn from_map(map: &BTreeMap<TimeBucket, String>) -> Self {
        let mut table = Self::default();
        for (bucket, id) in map {
            *table.slot(*bucket) = Some(id.clone());
        }
        table
    }
}

/// On-disk catalog layout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub defaults: DefaultsTable,
    #[serde(default, rename = "activity")]
    pub activities: Vec<ActivityMetadata>,
}

/// In-memory catalog with an id index.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    activities: Vec<ActivityMetadata>,
    index: HashMap<String, usize>,
    defaults: BTreeMap<TimeBucket, String>,
}

impl Catalog {
    /// Build a catalog, ordering yoga before breathing while keeping the
    /// given order within each kind.
    ///
    /// # Errors
    ///
    /// Returns an error if an id is empty or declared twice.
    pub fn new(
        mut activities: Vec<ActivityMetadata>,
        defaults: BTreeMap<TimeBucket, String>,
    ) -> Result<Self, CatalogError> {
        // sort_by_key is stable, so file order survives within a kind
        activities.sort_by_key(|a| a.kind);

        let mut index = HashMap::with_capacity(activities.len());
        for (pos, activity) in activities.iter().enumerate() {
            if activity.id.trim().is_empty() {
                return Err(CatalogError::EmptyId(pos));
            }
            if index.insert(activity.id.clone(), pos).is_some() {
                return Err(CatalogError::DuplicateId(activity.id.clone()));
            }
        }

        for (bucket, id) in &defaults {
            if !index.contains_key(id) {
                tracing::warn!(%bucket, activity_id = %id, "catalog default does not resolve");
            }
        }

        Ok(Self {
            activities,
            index,
            defaults,
        })
    }

    /// Parse a catalog from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or fails validation.
    pub fn from_toml_str(content: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(content)?;
        Self::new(file.activities, file.defaults.into_map())
    }

    /// Load a catalog file from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Ok(Self::from_toml_str(&content)?)
    }

    /// Serializable form of this catalog.
    pub fn to_file(&self) -> CatalogFile {
        CatalogFile {
            defaults: DefaultsTable::from_map(&self.defaults),
            activities: self.activities.clone(),
        }
    }

    /// Render as a TOML catalog file.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml_string(&self) -> Result<String, CoreError> {
        Ok(toml::to_string_pretty(&self.to_file())?)
    }

    pub fn len(&self) -> usize {
        self.activities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }

    /// The catalog shipped with the application.
    pub fn builtin() -> Self {
        use ActivityKind::{Breathing, Yoga};
        use TimeTag::*;

        let activities = vec![
            ActivityMetadata::new("morning-flow", "Morning Flow", Yoga, 20).with_tags([Morning]),
            ActivityMetadata::new("sun-salutation", "Sun Salutation", Yoga, 15)
                .with_tags([Morning, Midday]),
            ActivityMetadata::new("desk-stretch", "Desk Stretch", Yoga, 10)
                .with_tags([Midday, Afternoon]),
            ActivityMetadata::new("power-yoga", "Power Yoga", Yoga, 30).with_tags([Afternoon]),
            ActivityMetadata::new("hip-opener", "Hip Opener", Yoga, 25).with_tags([Evening]),
            ActivityMetadata::new("gentle-evening", "Gentle Evening Stretch", Yoga, 20)
                .with_tags([Evening, Night]),
            ActivityMetadata::new("yin-yoga", "Yin Yoga", Yoga, 35).with_tags([Night]),
            ActivityMetadata::new("box-breathing", "Box Breathing", Breathing, 5)
                .with_tags([Anytime]),
            ActivityMetadata::new("energizing-breath", "Energizing Breath", Breathing, 5)
                .with_tags([Morning, Midday]),
            ActivityMetadata::new("alternate-nostril", "Alternate Nostril", Breathing, 8)
                .with_tags([Afternoon, Evening]),
            ActivityMetadata::new("breath-4-7-8", "4-7-8 Breathing", Breathing, 6)
                .with_tags([Evening, Night]),
        ];

        let defaults = BTreeMap::from([
            (TimeBucket::Morning, "morning-flow".to_string()),
            (TimeBucket::Midday, "desk-stretch".to_string()),
            (TimeBucket::Afternoon, "alternate-nostril".to_string()),
            (TimeBucket::Evening, "gentle-evening".to_string()),
            (TimeBucket::Night, "breath-4-7-8".to_string()),
        ]);

        Self::new(activities, defaults).unwrap_or_default()
    }
}

impl CatalogAccessor for Catalog {
    fn lookup(&self, activity_id: &str) -> Option<&ActivityMetadata> {
        self.index.get(activity_id).map(|&pos| &self.activities[pos])
    }

    fn list_all(&self) -> &[ActivityMetadata] {
        &self.activities
    }

    fn default_activity_for(&self, bucket: TimeBucket) -> Option<&str> {
        self.defaults.get(&bucket).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_is_complete() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.len(), 11);
        for bucket in TimeBucket::ALL {
            let id = catalog.default_activity_for(bucket).unwrap();
            assert!(catalog.contains(id), "default for {bucket} must resolve");
        }
    }

    #[test]
    fn test_yoga_declared_before_breathing() {
        let catalog = Catalog::new(
            vec![
                ActivityMetadata::new("b1", "Breath One", ActivityKind::Breathing, 5),
                ActivityMetadata::new("y1", "Yoga One", ActivityKind::Yoga, 20),
                ActivityMetadata::new("b2", "Breath Two", ActivityKind::Breathing, 5),
                ActivityMetadata::new("y2", "Yoga Two", ActivityKind::Yoga, 20),
            ],
            BTreeMap::new(),
        )
        .unwrap();

        let ids: Vec<_> = catalog.list_all().iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["y1", "y2", "b1", "b2"]);
        assert_eq!(catalog.lookup("b2").unwrap().name, "Breath Two");
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let result = Catalog::new(
            vec![
                ActivityMetadata::new("dup", "A", ActivityKind::Yoga, 10),
                ActivityMetadata::new("dup", "B", ActivityKind::Breathing, 5),
            ],
            BTreeMap::new(),
        );
        assert!(matches!(result, Err(CatalogError::DuplicateId(id)) if id == "dup"));
    }

    #[test]
    fn test_empty_id_rejected() {
        let result = Catalog::new(
            vec![ActivityMetadata::new("  ", "Blank", ActivityKind::Yoga, 10)],
            BTreeMap::new(),
        );
        assert!(matches!(result, Err(CatalogError::EmptyId(0))));
    }

    #[test]
    fn test_from_toml_str() {
        let toml_str = r#"
            [defaults]
            morning = "wake"

            [[activity]]
            id = "calm"
            name = "Calm Breath"
            kind = "breathing"
            duration_minutes = 4
            time_tags = ["anytime"]

            [[activity]]
            id = "wake"
            name = "Wake Up Flow"
            kind = "yoga"
            duration_minutes = 12
            time_tags = ["morning", "midday"]
        "#;

        let catalog = Catalog::from_toml_str(toml_str).unwrap();
        assert_eq!(catalog.list_all()[0].id, "wake");
        assert_eq!(catalog.default_activity_for(TimeBucket::Morning), Some("wake"));
        assert_eq!(catalog.default_activity_for(TimeBucket::Night), None);
        assert!(catalog
            .lookup("wake")
            .unwrap()
            .time_tags
            .contains(&TimeTag::Midday));
    }

    #[test]
    fn test_catalog_file_roundtrip() {
        let catalog = Catalog::builtin();
        let toml_str = catalog.to_toml_string().unwrap();
        let parsed = Catalog::from_toml_str(&toml_str).unwrap();
        assert_eq!(parsed.list_all(), catalog.list_all());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.toml");
        std::fs::write(
            &path,
            "[[activity]]\nid = \"x\"\nname = \"X\"\nkind = \"yoga\"\nduration_minutes = 10\n",
        )
        .unwrap();

        let catalog = Catalog::load(&path).unwrap();
        assert!(catalog.contains("x"));
        assert!(catalog.lookup("x").unwrap().time_tags.is_empty());
    }
}
