use std::fmt::Display;
use std::hash::Hash;

use ahash::HashMap;

use crate::error::Error;

/// A factory producing a `T` from parameters `P`.
pub type Factory<T, P> = Box<dyn Fn(&P) -> Result<T, Error>>;

/// A map from keys to factories.
///
/// ```rust
/// use xmlbind::{Error, PluginManager};
///
/// let mut plugins: PluginManager<&str, String, String> = PluginManager::new();
/// plugins.register("upper", |s: &String| Ok(s.to_uppercase()));
/// assert_eq!(plugins.build(&"upper", &"abc".to_string())?, "ABC");
/// assert!(matches!(
///     plugins.build(&"lower", &"abc".to_string()),
///     Err(Error::UnknownPluginType(_))
/// ));
/// # Ok::<(), xmlbind::Error>(())
/// ```
pub struct PluginManager<K, T, P> {
    factories: HashMap<K, Factory<T, P>>,
}

impl<K: Eq + Hash + Display, T, P> PluginManager<K, T, P> {
    pub fn new() -> Self {
        PluginManager {
            factories: HashMap::default(),
        }
    }

    /// Register a factory, replacing any factory under the same key.
    pub fn register(&mut self, key: K, factory: impl Fn(&P) -> Result<T, Error> + 'static) {
        self.factories.insert(key, Box::new(factory));
    }

    /// Remove the factory for a key. Returns whether there was one.
    pub fn deregister(&mut self, key: &K) -> bool {
        self.factories.remove(key).is_some()
    }

    pub fn deregister_all(&mut self) {
        self.factories.clear();
    }

    pub fn is_registered(&self, key: &K) -> bool {
        self.factories.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.factories.keys()
    }

    /// Run the factory registered for `key`.
    ///
    /// Fails with [`Error::UnknownPluginType`] if nothing is registered.
    pub fn build(&self, key: &K, params: &P) -> Result<T, Error> {
        let factory = self
            .factories
            .get(key)
            .ok_or_else(|| Error::UnknownPluginType(key.to_string()))?;
        factory(params)
    }
}

impl<K: Eq + Hash + Display, T, P> Default for PluginManager<K, T, P> {
    fn default() -> Self {
        Self::new()
    }
}
