/// Allocates and recycles GL-style object names.
///
/// Names are non-zero `u32` values; `0` is the null object, exactly as in the
/// GL object model. Backends use this to hand out `ShaderHandle` and
/// `ProgramHandle` values. Freed names are recycled on subsequent allocations.
///
/// # Example
///
/// ```
/// use shader_baker::utils::NameAllocator;
///
/// let mut names = NameAllocator::new();
/// let a = names.alloc();  // 1
/// let b = names.alloc();  // 2
/// names.free(a);          // 1 is now available
/// let c = names.alloc();  // 1 (recycled)
/// assert_eq!((a, b, c), (1, 2, 1));
/// ```
pub struct NameAllocator {
    free_list: Vec<u32>,
    next_name: u32,
    live: u32,
}

impl NameAllocator {
    /// Create a new empty allocator
    pub fn new() -> Self {
        Self {
            free_list: Vec::new(),
            next_name: 1,
            live: 0,
        }
    }

    /// Allocate the next available name
    pub fn alloc(&mut self) -> u32 {
        self.live += 1;
        self.free_list.pop().unwrap_or_else(|| {
            let name = self.next_name;
            self.next_name += 1;
            name
        })
    }

    /// Return a name to the pool for reuse
    pub fn free(&mut self, name: u32) {
        debug_assert!(
            name != 0 && name < self.next_name,
            "freeing a name that was never allocated: {}",
            name
        );
        debug_assert!(!self.free_list.contains(&name), "double free of name {}", name);
        self.live -= 1;
        self.free_list.push(name);
    }

    /// Number of names currently in use
    pub fn live(&self) -> u32 {
        self.live
    }

    /// Whether no names are currently in use
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }
}

impl Default for NameAllocator {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "name_allocator_tests.rs"]
mod tests;
