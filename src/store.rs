//! Storage of zone files.
//!
//! The signing workflow keeps no state of its own: which stage a zone is in
//! follows from the zone files that exist. [`ZoneStore`] is the view of
//! those files the workflow needs.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use crate::error::Error;
use crate::util::write_file_atomic;
use crate::zone::{ZoneContext, ZoneLayout, ZoneName};

pub trait ZoneStore {
    /// Read a zone file, `None` if it doesn't exist.
    fn get_zone_file(
        &self,
        zone: &ZoneName,
        context: ZoneContext,
    ) -> Result<Option<String>, Error>;

    /// Create or replace a zone file.
    fn put_zone_file(
        &self,
        zone: &ZoneName,
        context: ZoneContext,
        content: &str,
    ) -> Result<(), Error>;

    fn has_zone_file(&self, zone: &ZoneName, context: ZoneContext) -> Result<bool, Error> {
        Ok(self.get_zone_file(zone, context)?.is_some())
    }

    /// Make sure external tools can write zone files of a context.
    fn ensure_context_dir(&self, _context: ZoneContext) -> Result<(), Error> {
        Ok(())
    }

    /// A human readable location of a zone file, for messages.
    fn describe(&self, zone: &ZoneName, context: ZoneContext) -> String;
}

impl<S: ZoneStore> ZoneStore for &S {
    fn get_zone_file(
        &self,
        zone: &ZoneName,
        context: ZoneContext,
    ) -> Result<Option<String>, Error> {
        (**self).get_zone_file(zone, context)
    }

    fn put_zone_file(
        &self,
        zone: &ZoneName,
        context: ZoneContext,
        content: &str,
    ) -> Result<(), Error> {
        (**self).put_zone_file(zone, context, content)
    }

    fn has_zone_file(&self, zone: &ZoneName, context: ZoneContext) -> Result<bool, Error> {
        (**self).has_zone_file(zone, context)
    }

    fn ensure_context_dir(&self, context: ZoneContext) -> Result<(), Error> {
        (**self).ensure_context_dir(context)
    }

    fn describe(&self, zone: &ZoneName, context: ZoneContext) -> String {
        (**self).describe(zone, context)
    }
}

//------------ FsZoneStore ---------------------------------------------------

/// Zone files in a directory tree.
pub struct FsZoneStore {
    layout: ZoneLayout,
}

impl FsZoneStore {
    pub fn new(layout: ZoneLayout) -> Self {
        Self { layout }
    }

    fn path(&self, zone: &ZoneName, context: ZoneContext) -> PathBuf {
        self.layout.zone_file(zone, context)
    }
}

impl ZoneStore for FsZoneStore {
    fn get_zone_file(
        &self,
        zone: &ZoneName,
        context: ZoneContext,
    ) -> Result<Option<String>, Error> {
        let path = self.path(zone, context);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(format!("unable to load file '{}': {err}", path.display()).into()),
        }
    }

    fn put_zone_file(
        &self,
        zone: &ZoneName,
        context: ZoneContext,
        content: &str,
    ) -> Result<(), Error> {
        self.ensure_context_dir(context)?;
        write_file_atomic(self.path(zone, context), content)
    }

    fn has_zone_file(&self, zone: &ZoneName, context: ZoneContext) -> Result<bool, Error> {
        Ok(self.path(zone, context).is_file())
    }

    fn ensure_context_dir(&self, context: ZoneContext) -> Result<(), Error> {
        let dir = self.layout.zones_dir(context);
        fs::create_dir_all(&dir)
            .map_err(|err| format!("unable to create '{}': {err}", dir.display()).into())
    }

    fn describe(&self, zone: &ZoneName, context: ZoneContext) -> String {
        self.path(zone, context).display().to_string()
    }
}

//------------ MemZoneStore --------------------------------------------------

/// Zone files kept in memory.
#[cfg(test)]
#[derive(Default)]
pub struct MemZoneStore {
    files: std::cell::RefCell<std::collections::HashMap<(ZoneName, ZoneContext), String>>,
}

#[cfg(test)]
impl MemZoneStore {
    pub fn with_file(self, zone: &ZoneName, context: ZoneContext, content: &str) -> Self {
        self.files
            .borrow_mut()
            .insert((zone.clone(), context), content.into());
        self
    }
}

#[cfg(test)]
impl ZoneStore for MemZoneStore {
    fn get_zone_file(
        &self,
        zone: &ZoneName,
        context: ZoneContext,
    ) -> Result<Option<String>, Error> {
        Ok(self.files.borrow().get(&(zone.clone(), context)).cloned())
    }

    fn put_zone_file(
        &self,
        zone: &ZoneName,
        context: ZoneContext,
        content: &str,
    ) -> Result<(), Error> {
        self.files
            .borrow_mut()
            .insert((zone.clone(), context), content.into());
        Ok(())
    }

    fn describe(&self, zone: &ZoneName, context: ZoneContext) -> String {
        format!("{context}/{}", zone.file_name())
    }
}

//============ Tests =========================================================

#[cfg(test)]
mod tests {
    use std::fs;

    use crate::zone::{ZoneContext, ZoneLayout, ZoneName};

    use super::{FsZoneStore, ZoneStore};

    #[test]
    fn fs_store_round_trip() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = FsZoneStore::new(ZoneLayout::new(dir.path().join("zones"), dir.path()));
        let zone: ZoneName = "example.com".parse().unwrap();

        for context in ZoneContext::ALL {
            assert_eq!(store.get_zone_file(&zone, context).unwrap(), None);
            assert!(!store.has_zone_file(&zone, context).unwrap());
        }

        store
            .put_zone_file(&zone, ZoneContext::Unsigned, "first")
            .unwrap();
        store
            .put_zone_file(&zone, ZoneContext::Unsigned, "second")
            .unwrap();

        let path = dir.path().join("zones/unsigned/example.com.zone");
        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
        assert_eq!(
            store.get_zone_file(&zone, ZoneContext::Unsigned).unwrap(),
            Some("second".into())
        );
        assert!(store.has_zone_file(&zone, ZoneContext::Unsigned).unwrap());
        assert!(!store.has_zone_file(&zone, ZoneContext::Signed).unwrap());
        assert_eq!(
            store.describe(&zone, ZoneContext::Unsigned),
            path.display().to_string()
        );

        // No temporary files are left behind.
        let entries = fs::read_dir(dir.path().join("zones/unsigned")).unwrap();
        assert_eq!(entries.count(), 1);
    }

    #[test]
    fn context_dir_is_created_once_needed() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = FsZoneStore::new(ZoneLayout::new(dir.path().join("zones"), dir.path()));
        let signed = dir.path().join("zones/signed");

        assert!(!signed.exists());
        store.ensure_context_dir(ZoneContext::Signed).unwrap();
        assert!(signed.is_dir());

        // An existing directory is fine.
        store.ensure_context_dir(ZoneContext::Signed).unwrap();
        assert!(!dir.path().join("zones/unsigned").exists());
    }
}
