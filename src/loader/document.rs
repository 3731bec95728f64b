//! Streaming decoder for one archive document
//!
//! A document is a JSON object whose keys name entity collections and whose
//! values are arrays of entities:
//!
//! ```text
//! {"users": [{...}, {...}], "visits": [{...}]}
//! ```
//!
//! Elements are decoded and inserted one at a time, so a document is never
//! held in memory as a whole.

use crate::loader::{LoadStats, LoaderError};
use crate::store::{EntityKind, EntityStore, Location, StoreError, User, Visit};
use serde::de::{self, DeserializeSeed, Deserializer, MapAccess, SeqAccess, Visitor};
use std::fmt;
use std::io::Read;

const SECTIONS: &[&str] = &["users", "locations", "visits"];

/// Where decoded entities go
struct Sink<'a> {
    entry: &'a str,
    store: &'a EntityStore,
    stats: &'a LoadStats,
}

impl Sink<'_> {
    fn accept(&self, kind: EntityKind, id: u32, result: Result<(), StoreError>) {
        match result {
            Ok(()) => self.stats.record(kind),
            Err(e) => {
                tracing::warn!(entry = %self.entry, id, "Skipping {}: {}", kind, e);
                self.stats.record_skipped();
            }
        }
    }

    fn user(&self, user: User) {
        let id = user.id;
        self.accept(EntityKind::User, id, self.store.insert_user(user));
    }

    fn location(&self, location: Location) {
        let id = location.id;
        self.accept(EntityKind::Location, id, self.store.insert_location(location));
    }

    fn visit(&self, visit: Visit) {
        let id = visit.id;
        self.accept(EntityKind::Visit, id, self.store.insert_visit(visit));
    }
}

/// Decode a document from `reader` into `store`
///
/// Any structural problem (non-object root, unknown section, non-array
/// section, malformed element, trailing data) fails the whole document.
pub fn load_document<R: Read>(
    reader: R,
    entry: &str,
    store: &EntityStore,
    stats: &LoadStats,
) -> Result<(), LoaderError> {
    let sink = Sink {
        entry,
        store,
        stats,
    };
    let mut de = serde_json::Deserializer::from_reader(reader);

    DocumentSeed { sink: &sink }
        .deserialize(&mut de)
        .and_then(|()| de.end())
        .map_err(|source| LoaderError::Parse {
            entry: entry.to_string(),
            source,
        })
}

struct DocumentSeed<'a> {
    sink: &'a Sink<'a>,
}

impl<'de> DeserializeSeed<'de> for DocumentSeed<'_> {
    type Value = ();

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<(), D::Error> {
        deserializer.deserialize_map(self)
    }
}

impl<'de> Visitor<'de> for DocumentSeed<'_> {
    type Value = ();

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object of users, locations and visits arrays")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<(), A::Error> {
        while let Some(key) = map.next_key::<String>()? {
            let kind = EntityKind::from_collection(&key)
                .ok_or_else(|| <A::Error as de::Error>::unknown_field(&key, SECTIONS))?;

            tracing::info!(entry = %self.sink.entry, "Loading {}", key);
            map.next_value_seed(SectionSeed {
                kind,
                sink: self.sink,
            })?;
        }
        Ok(())
    }
}

struct SectionSeed<'a> {
    kind: EntityKind,
    sink: &'a Sink<'a>,
}

impl<'de> DeserializeSeed<'de> for SectionSeed<'_> {
    type Value = ();

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<(), D::Error> {
        deserializer.deserialize_seq(self)
    }
}

impl<'de> Visitor<'de> for SectionSeed<'_> {
    type Value = ();

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "an array of {}", self.kind.collection())
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<(), A::Error> {
        match self.kind {
            EntityKind::User => {
                while let Some(user) = seq.next_element::<User>()? {
                    self.sink.user(user);
                }
            }
            EntityKind::Location => {
                while let Some(location) = seq.next_element::<Location>()? {
                    self.sink.location(location);
                }
            }
            EntityKind::Visit => {
                while let Some(visit) = seq.next_element::<Visit>()? {
                    self.sink.visit(visit);
                }
            }
        }
        Ok(())
    }
}
