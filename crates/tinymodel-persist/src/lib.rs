//! Model state machine and persistence lifecycle for TinyModel Rust.
//!
//! [`Model<E>`] is one row of entity `E` held in memory. It tracks attribute
//! changes against the state it was loaded or last saved with, guards mass
//! assignment, casts date attributes, and turns `save` / `remove` / `refresh`
//! into calls on the connection resolved for the entity.
//!
//! # Lifecycle
//!
//! ```ignore
//! let mut torrent = Model::<Torrent>::instance(resolver.clone(), vec![
//!     AttributeItem::new("name", "test1"),
//!     AttributeItem::new("size", 11),
//! ])?;
//! torrent.save(SaveOptions::default())?;      // INSERT, exists() == true
//!
//! torrent.set_attribute("size", 12);
//! assert!(torrent.is_dirty_any(&["size"]));
//! torrent.save(SaveOptions::default())?;      // UPDATE torrents SET size = 12
//! assert!(torrent.was_changed_any(&["size"]));
//!
//! torrent.remove()?;                          // DELETE, exists() == false
//! ```

mod attributes;
mod guards;
mod lookup;
mod model;
mod persistence;
mod relations;
mod timestamps;

pub use model::Model;
pub use persistence::SaveOptions;
