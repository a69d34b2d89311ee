//! Instrumentable functions.
//!
//! A [`Function`] is created by the symbol loader once a module's debug data is
//! available. Identity fields never change afterwards; classification is computed
//! from the pretty name at construction. Selection lives in a
//! [`SelectionRegistry`], not on the function itself.

pub mod calling_convention;
pub mod classifier;

use std::sync::{Arc, OnceLock};
use tracing::{debug, info};

use crate::selection::SelectionRegistry;
use crate::stats::{FunctionStats, StatsSnapshot, Timer};

pub use calling_convention::{
    calling_convention_code, calling_convention_name, CALLING_CONVENTIONS,
    UNKNOWN_CALLING_CONVENTION,
};
pub use classifier::{classify_pretty_name, ApiRole, API_NAMESPACE_PREFIX, API_ROLE_FRAGMENTS};

/// Code used until the loader reports a calling convention.
pub const CALLING_CONVENTION_UNSET: i32 = -1;

#[derive(Debug)]
pub struct Function {
    name: String,
    pretty_name: String,
    loaded_module_path: String,
    module_base_address: u64,
    address: u64,
    load_bias: u64,
    size: u64,
    file: String,
    line: u32,
    calling_convention: i32,
    api_role: ApiRole,
    stats: OnceLock<Arc<FunctionStats>>,
}

impl Function {
    pub fn new(
        name: impl Into<String>,
        pretty_name: impl Into<String>,
        address: u64,
        load_bias: u64,
        size: u64,
        file: impl Into<String>,
        line: u32,
    ) -> Self {
        let function = Self::without_stats(
            name.into(),
            pretty_name.into(),
            address,
            load_bias,
            size,
            file.into(),
            line,
        );
        function.reset_stats();
        function
    }

    /// Builds a function whose statistics were never recorded. Used when decoding
    /// records written before statistics were persisted.
    pub(crate) fn without_stats(
        name: String,
        pretty_name: String,
        address: u64,
        load_bias: u64,
        size: u64,
        file: String,
        line: u32,
    ) -> Self {
        let pretty_name = if !pretty_name.is_empty() {
            pretty_name
        } else if !name.is_empty() {
            name.clone()
        } else {
            format!("{address:#x}")
        };

        let mut function = Self {
            name,
            pretty_name,
            loaded_module_path: String::new(),
            module_base_address: 0,
            address,
            load_bias,
            size,
            file,
            line,
            calling_convention: CALLING_CONVENTION_UNSET,
            api_role: ApiRole::None,
            stats: OnceLock::new(),
        };
        function.set_api_role_from_name();
        function
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pretty_name(&self) -> &str {
        &self.pretty_name
    }

    pub fn loaded_module_path(&self) -> &str {
        &self.loaded_module_path
    }

    pub fn module_base_address(&self) -> u64 {
        self.module_base_address
    }

    pub fn address(&self) -> u64 {
        self.address
    }

    pub fn load_bias(&self) -> u64 {
        self.load_bias
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn calling_convention(&self) -> i32 {
        self.calling_convention
    }

    pub fn api_role(&self) -> ApiRole {
        self.api_role
    }

    pub fn is_api_function(&self) -> bool {
        self.api_role != ApiRole::None
    }

    pub fn set_loaded_module_path(&mut self, path: impl Into<String>) {
        self.loaded_module_path = path.into();
    }

    /// Base the module was mapped at in the target process; 0 means unresolved.
    pub fn set_module_base_address(&mut self, base: u64) {
        self.module_base_address = base;
    }

    pub fn set_calling_convention(&mut self, code: i32) {
        self.calling_convention = code;
    }

    /// Offset of the function inside its module file.
    pub fn offset(&self) -> u64 {
        self.address.wrapping_sub(self.load_bias)
    }

    /// Address of the function in the target process. An unresolved module base
    /// composes as zero.
    pub fn virtual_address(&self) -> u64 {
        self.module_base_address
            .wrapping_add(self.address)
            .wrapping_sub(self.load_bias)
    }

    pub fn select(self: &Arc<Self>, registry: &SelectionRegistry) {
        if self.module_base_address == 0 {
            debug!(
                "Module base of {} is unresolved, selecting at module-relative address",
                self.pretty_name
            );
        }
        info!(
            "Selected {} at {:#x} (address={:#x}, load_bias={:#x}, base_address={:#x})",
            self.pretty_name,
            self.virtual_address(),
            self.address,
            self.load_bias,
            self.module_base_address
        );
        registry.insert(self.virtual_address(), self);
    }

    pub fn unselect(&self, registry: &SelectionRegistry) {
        registry.remove(self.virtual_address());
    }

    /// True if any live function is registered at this function's virtual address.
    pub fn is_selected(&self, registry: &SelectionRegistry) -> bool {
        registry.contains(self.virtual_address())
    }

    pub fn reset_stats(&self) {
        let mut created = false;
        let stats = self.stats.get_or_init(|| {
            created = true;
            Arc::new(FunctionStats::new())
        });
        if !created {
            stats.reset();
        }
    }

    pub fn update_stats(&self, timer: &Timer) {
        if let Some(stats) = self.stats.get() {
            stats.update(timer);
        }
    }

    /// Shared handle to the statistics, `None` if they were never recorded.
    pub fn stats(&self) -> Option<Arc<FunctionStats>> {
        self.stats.get().cloned()
    }

    pub fn stats_snapshot(&self) -> Option<StatsSnapshot> {
        self.stats.get().map(|s| s.snapshot())
    }

    pub(crate) fn restore_stats(&self, snapshot: &StatsSnapshot) {
        match self.stats.get() {
            Some(stats) => stats.restore(snapshot),
            None => {
                let _ = self
                    .stats
                    .set(Arc::new(FunctionStats::from_snapshot(snapshot)));
            }
        }
    }

    pub fn calling_convention_str(&self) -> &'static str {
        calling_convention_name(self.calling_convention)
    }

    /// Assigns the API role derived from the pretty name. Returns whether a role
    /// was assigned.
    pub fn set_api_role_from_name(&mut self) -> bool {
        match classify_pretty_name(&self.pretty_name) {
            Some(role) => {
                self.api_role = role;
                true
            }
            None => false,
        }
    }
}
