//! Module resolution and loading for installed extensions
//!
//! An extension's main class lives in the entry module of its package. The
//! [`ModuleResolver`] turns a package directory (or any specifier relative to
//! it) into an entry file, and the [`ModuleLoader`] reads that file and
//! reports the names it exports.
//!
//! Loaded modules are cached per path for the life of the loader. When
//! [`LoaderConfig::force_reload`] is set, callers evict the cached module
//! before every load so edits to an extension are picked up.

use extman_core::config::DEFAULT_PACKAGES_DIR;
use extman_core::{Error, Result};
use regex::Regex;
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};
use tracing::debug;

/// Extensions tried, in order, when a file specifier has none
const MODULE_EXTENSIONS: &[&str] = &["js", "cjs", "mjs", "json"];

/// Package descriptor read when resolving a directory
const PACKAGE_DESCRIPTOR: &str = "package.json";

/// Entry file used when the descriptor has no `main`
const DEFAULT_ENTRY: &str = "index.js";

/// Resolves module specifiers to files
pub trait ModuleResolver: Send + Sync {
    /// Resolve `specifier` relative to `base_dir`
    ///
    /// Fails with [`Error::ModuleNotFound`] if nothing matches.
    fn resolve(&self, base_dir: &Path, specifier: &str) -> Result<PathBuf>;
}

/// Node-style package resolver
///
/// - `./x`, `../x` and absolute specifiers are joined to the base directory
/// - bare specifiers are looked up under `<base>/<packages_dir>/`
/// - files are tried as-is, then with each known module extension
/// - directories resolve through `package.json` `main`, else `index.js`
#[derive(Debug, Clone)]
pub struct PackageResolver {
    packages_dir: String,
}

impl Default for PackageResolver {
    fn default() -> Self {
        Self::new(DEFAULT_PACKAGES_DIR)
    }
}

impl PackageResolver {
    pub fn new(packages_dir: impl Into<String>) -> Self {
        Self {
            packages_dir: packages_dir.into(),
        }
    }

    fn is_path_specifier(specifier: &str) -> bool {
        specifier == "."
            || specifier == ".."
            || specifier.starts_with("./")
            || specifier.starts_with("../")
            || Path::new(specifier).is_absolute()
    }

    fn resolve_file(candidate: &Path) -> Option<PathBuf> {
        if candidate.is_file() {
            return Some(candidate.to_path_buf());
        }

        MODULE_EXTENSIONS.iter().find_map(|ext| {
            let mut with_ext = OsString::from(candidate.as_os_str());
            with_ext.push(".");
            with_ext.push(ext);
            let with_ext = PathBuf::from(with_ext);
            with_ext.is_file().then_some(with_ext)
        })
    }

    fn resolve_directory(dir: &Path) -> Option<PathBuf> {
        if !dir.is_dir() {
            return None;
        }

        if let Some(main) = Self::read_main(dir) {
            let entry = dir.join(&main);
            if let Some(found) = Self::resolve_file(&entry) {
                return Some(found);
            }
            if let Some(found) = Self::resolve_file(&entry.join(DEFAULT_ENTRY)) {
                return Some(found);
            }
            debug!("package.json main {:?} in {:?} does not exist", main, dir);
        }

        Self::resolve_file(&dir.join(DEFAULT_ENTRY))
    }

    fn read_main(dir: &Path) -> Option<String> {
        let content = std::fs::read_to_string(dir.join(PACKAGE_DESCRIPTOR)).ok()?;
        let descriptor: Value = serde_json::from_str(&content).ok()?;
        descriptor
            .get("main")
            .and_then(Value::as_str)
            .filter(|main| !main.is_empty())
            .map(str::to_string)
    }
}

impl ModuleResolver for PackageResolver {
    fn resolve(&self, base_dir: &Path, specifier: &str) -> Result<PathBuf> {
        let candidate = if Self::is_path_specifier(specifier) {
            base_dir.join(specifier)
        } else {
            base_dir.join(&self.packages_dir).join(specifier)
        };

        let resolved = Self::resolve_file(&candidate)
            .or_else(|| Self::resolve_directory(&candidate))
            .ok_or_else(|| Error::module_not_found(specifier, base_dir))?;

        debug!("Resolved '{}' from {:?} to {:?}", specifier, base_dir, resolved);
        Ok(resolved)
    }
}

/// A loaded module and the names it exports
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedModule {
    path: PathBuf,
    exports: BTreeSet<String>,
}

impl LoadedModule {
    /// Read and scan the module at `path`
    pub fn read(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        let exports = if path.extension().is_some_and(|e| e == "json") {
            json_exports(&source)?
        } else {
            scan_exports(&source)
        };

        Ok(Self {
            path: path.to_path_buf(),
            exports,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Exported names, sorted
    pub fn exports(&self) -> impl Iterator<Item = &str> {
        self.exports.iter().map(String::as_str)
    }

    pub fn has_export(&self, name: &str) -> bool {
        self.exports.contains(name)
    }

    /// Look up an export, failing with [`Error::ExportNotFound`]
    pub fn export(&self, name: &str) -> Result<&str> {
        self.exports
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| Error::export_not_found(name, &self.path))
    }
}

/// Handle to an extension's main class, ready for the host to instantiate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MainClass {
    /// Exported class name
    pub name: String,

    /// Entry module exporting it
    pub module_path: PathBuf,

    /// Package directory the module was resolved from
    pub package_dir: PathBuf,
}

/// Loader settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoaderConfig {
    /// Evict cached modules before loading them again
    pub force_reload: bool,
}

/// Loads modules, caching them by path
pub trait ModuleLoader: Send + Sync {
    /// Load (or return the cached) module at `path`
    fn load(&self, path: &Path) -> Result<Arc<LoadedModule>>;

    /// Drop the cached module at `path`; `true` if one was cached
    fn evict(&self, path: &Path) -> bool;

    /// Whether callers must evict before loading
    fn force_reload(&self) -> bool;
}

/// Process-wide module cache
#[derive(Debug, Default)]
pub struct CachedModuleLoader {
    config: LoaderConfig,
    cache: Mutex<HashMap<PathBuf, Arc<LoadedModule>>>,
}

impl CachedModuleLoader {
    pub fn new(config: LoaderConfig) -> Self {
        Self {
            config,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Number of cached modules
    pub fn cached(&self) -> usize {
        self.cache.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    fn cache_key(path: &Path) -> PathBuf {
        path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
    }
}

impl ModuleLoader for CachedModuleLoader {
    fn load(&self, path: &Path) -> Result<Arc<LoadedModule>> {
        let key = Self::cache_key(path);
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(module) = cache.get(&key) {
            debug!("Module cache hit: {:?}", key);
            return Ok(Arc::clone(module));
        }

        debug!("Loading module: {:?}", key);
        let module = Arc::new(LoadedModule::read(&key)?);
        cache.insert(key, Arc::clone(&module));
        Ok(module)
    }

    fn evict(&self, path: &Path) -> bool {
        let key = Self::cache_key(path);
        let evicted = self
            .cache
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&key)
            .is_some();
        if evicted {
            debug!("Evicted cached module: {:?}", key);
        }
        evicted
    }

    fn force_reload(&self) -> bool {
        self.config.force_reload
    }
}

fn identifier_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z_$][\w$]*$").expect("valid identifier regex"))
}

fn declaration_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"\bexport\s+(?:declare\s+)?(?:abstract\s+)?(?:async\s+)?(?:class|function\*?|const|let|var)\s+([A-Za-z_$][\w$]*)",
        )
        .expect("valid declaration regex")
    })
}

fn export_list_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\bexport\s*\{([^}]*)\}").expect("valid export list regex"))
}

fn export_default_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\bexport\s+default\b").expect("valid export default regex"))
}

fn commonjs_property_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b(?:module\.)?exports\.([A-Za-z_$][\w$]*)\s*=(?:[^=]|$)")
            .expect("valid exports property regex")
    })
}

fn commonjs_object_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\bmodule\.exports\s*=\s*\{([^}]*)\}").expect("valid module.exports regex")
    })
}

fn commonjs_single_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\bmodule\.exports\s*=\s*[A-Za-z_$(]").expect("valid module.exports regex")
    })
}

/// Collect the names a JavaScript/TypeScript module exports
///
/// This is a static scan; it does not evaluate the module.
pub fn scan_exports(source: &str) -> BTreeSet<String> {
    let mut exports = BTreeSet::new();

    for caps in declaration_regex().captures_iter(source) {
        exports.insert(caps[1].to_string());
    }

    for caps in export_list_regex().captures_iter(source) {
        for item in caps[1].split(',') {
            // `local as exported` exports under the second name
            let exported = item.split_whitespace().last().unwrap_or_default();
            if identifier_regex().is_match(exported) {
                exports.insert(exported.to_string());
            }
        }
    }

    if export_default_regex().is_match(source) {
        exports.insert("default".to_string());
    }

    for caps in commonjs_property_regex().captures_iter(source) {
        exports.insert(caps[1].to_string());
    }

    let mut object_assigned = false;
    for caps in commonjs_object_regex().captures_iter(source) {
        object_assigned = true;
        for item in caps[1].split(',') {
            let key = item.split(':').next().unwrap_or_default().trim();
            if identifier_regex().is_match(key) {
                exports.insert(key.to_string());
            }
        }
    }

    if !object_assigned && commonjs_single_regex().is_match(source) {
        exports.insert("default".to_string());
    }

    exports
}

fn json_exports(source: &str) -> Result<BTreeSet<String>> {
    let value: Value = serde_json::from_str(source)?;
    Ok(match value {
        Value::Object(map) => map.keys().cloned().collect(),
        _ => BTreeSet::new(),
    })
}
