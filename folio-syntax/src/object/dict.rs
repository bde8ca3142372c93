//! Dictionaries.

use crate::object::{Name, Object, ObjectId};
use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt::{Debug, Formatter};

/// A dictionary, mapping names to objects.
///
/// Entries are kept sorted by key, so iteration order is deterministic regardless of the
/// order in the file. Duplicate keys keep the last value, and a `null` value is
/// equivalent to the key being absent.
#[derive(Clone, Default, PartialEq)]
pub struct Dict(BTreeMap<Name, Object>);

impl Dict {
    /// Create a new empty dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry. `null` values remove the key.
    pub fn insert(&mut self, key: impl Into<Name>, value: Object) {
        let key = key.into();

        if matches!(value, Object::Null) {
            self.0.remove(&key);
        } else {
            self.0.insert(key, value);
        }
    }

    /// Returns the number of entries in the dictionary.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Return whether the dictionary is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Checks whether the dictionary contains an entry with a specific key.
    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.0.contains_key(key)
    }

    /// Returns the entry of a key, without resolving references.
    pub fn get(&self, key: &[u8]) -> Option<&Object> {
        self.0.get(key)
    }

    /// Returns the entry of a key if it is a name.
    pub fn get_name(&self, key: &[u8]) -> Option<&Name> {
        self.get(key)?.as_name()
    }

    /// Returns the entry of a key if it is an integer.
    pub fn get_int(&self, key: &[u8]) -> Option<i64> {
        self.get(key)?.as_i64()
    }

    /// Returns the entry of a key if it is an indirect reference.
    pub fn get_ref(&self, key: &[u8]) -> Option<ObjectId> {
        self.get(key)?.as_reference()
    }

    /// Whether the `/Type` entry of the dictionary is the given name.
    pub fn is_type(&self, name: &[u8]) -> bool {
        self.get_name(keys::TYPE).is_some_and(|n| n.as_bytes() == name)
    }

    /// Returns an iterator over all keys in the dictionary.
    pub fn keys(&self) -> impl Iterator<Item = &Name> {
        self.0.keys()
    }

    /// Returns an iterator over all entries in the dictionary.
    pub fn iter(&self) -> btree_map::Iter<'_, Name, Object> {
        self.0.iter()
    }

    /// Add all entries of `other` whose keys are not yet present.
    pub fn fill_from(&mut self, other: &Self) {
        for (key, value) in other.iter() {
            self.0.entry(key.clone()).or_insert_with(|| value.clone());
        }
    }
}

impl<'a> IntoIterator for &'a Dict {
    type Item = (&'a Name, &'a Object);
    type IntoIter = btree_map::Iter<'a, Name, Object>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Debug for Dict {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.0.iter()).finish()
    }
}

/// A collection of dictionary keys used throughout the crates.
#[allow(missing_docs)]
pub mod keys {
    macro_rules! key {
        ($i:ident, $e:expr) => {
            pub const $i: &[u8] = $e;
        };
    }

    key!(A, b"A");
    key!(AA, b"AA");
    key!(ACRO_FORM, b"AcroForm");
    key!(ANNOTS, b"Annots");
    key!(AUTHOR, b"Author");
    key!(BITS_PER_COMPONENT, b"BitsPerComponent");
    key!(CATALOG, b"Catalog");
    key!(COLORS, b"Colors");
    key!(COLUMNS, b"Columns");
    key!(COUNT, b"Count");
    key!(CREATION_DATE, b"CreationDate");
    key!(CREATOR, b"Creator");
    key!(CROP_BOX, b"CropBox");
    key!(DECODE_PARMS, b"DecodeParms");
    key!(DESCENDANT_FONTS, b"DescendantFonts");
    key!(DP, b"DP");
    key!(EARLY_CHANGE, b"EarlyChange");
    key!(EF, b"EF");
    key!(EMBEDDED_FILES, b"EmbeddedFiles");
    key!(ENCRYPT, b"Encrypt");
    key!(EXTENDS, b"Extends");
    key!(F, b"F");
    key!(FILTER, b"Filter");
    key!(FIRST, b"First");
    key!(FONT, b"Font");
    key!(FONT_DESCRIPTOR, b"FontDescriptor");
    key!(FONT_FILE, b"FontFile");
    key!(FONT_FILE2, b"FontFile2");
    key!(FONT_FILE3, b"FontFile3");
    key!(ID, b"ID");
    key!(INDEX, b"Index");
    key!(INFO, b"Info");
    key!(JS, b"JS");
    key!(JAVA_SCRIPT, b"JavaScript");
    key!(KEYWORDS, b"Keywords");
    key!(KIDS, b"Kids");
    key!(LENGTH, b"Length");
    key!(LINEARIZED, b"Linearized");
    key!(MEDIA_BOX, b"MediaBox");
    key!(METADATA, b"Metadata");
    key!(MOD_DATE, b"ModDate");
    key!(N, b"N");
    key!(NAME, b"Name");
    key!(NAMES, b"Names");
    key!(OPEN_ACTION, b"OpenAction");
    key!(OUTPUT_INTENTS, b"OutputIntents");
    key!(PAGE, b"Page");
    key!(PAGES, b"Pages");
    key!(PARENT, b"Parent");
    key!(PREDICTOR, b"Predictor");
    key!(PREV, b"Prev");
    key!(PRODUCER, b"Producer");
    key!(RESOURCES, b"Resources");
    key!(ROOT, b"Root");
    key!(ROTATE, b"Rotate");
    key!(S, b"S");
    key!(SIZE, b"Size");
    key!(SUBJECT, b"Subject");
    key!(SUBTYPE, b"Subtype");
    key!(TITLE, b"Title");
    key!(TYPE, b"Type");
    key!(VERSION, b"Version");
    key!(W, b"W");
    key!(XFA, b"XFA");
    key!(XML, b"XML");
    key!(XREF, b"XRef");
    key!(XREF_STM, b"XRefStm");
    key!(OBJ_STM, b"ObjStm");
}

#[cfg(test)]
mod tests {
    use super::{Dict, keys};
    use crate::object::{Name, Object};

    #[test]
    fn null_means_absent() {
        let mut dict = Dict::new();
        dict.insert("Type", Object::Name(Name::from("Page")));
        dict.insert("Type", Object::Null);
        assert!(dict.is_empty());
    }

    #[test]
    fn lookup_by_bytes() {
        let mut dict = Dict::new();
        dict.insert("Count", Object::Integer(3));
        dict.insert("Type", Object::Name(Name::from("Pages")));

        assert_eq!(dict.get_int(keys::COUNT), Some(3));
        assert!(dict.is_type(b"Pages"));
        assert!(!dict.is_type(b"Page"));
        assert_eq!(dict.keys().count(), 2);
    }

    #[test]
    fn fill_keeps_existing() {
        let mut newer = Dict::new();
        newer.insert("Size", Object::Integer(10));
        let mut older = Dict::new();
        older.insert("Size", Object::Integer(4));
        older.insert("Info", Object::Integer(1));

        newer.fill_from(&older);
        assert_eq!(newer.get_int(keys::SIZE), Some(10));
        assert_eq!(newer.get_int(keys::INFO), Some(1));
    }
}
