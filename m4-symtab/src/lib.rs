//! Chained hash table mapping macro names to their definitions.
//!
//! Both builtins and user macros live in the same table: a builtin is
//! registered at startup with `def = None`, and `define` simply upserts a
//! `Some(body)` over whatever was there — which is how a user can shadow a
//! builtin by redefining its name. Lookup therefore answers one question
//! ("is this name known, and if so what is it bound to"), not two.
//!
//! The table is a fixed array of buckets, each the head of its own singly
//! linked chain of entries, rather than [`std::collections::HashMap`] —
//! the hashing and chaining are the thing being modeled here, not an
//! incidental storage choice.

const HASH_TABLE_SIZE: usize = 16384;

/// One binding: a name and its (possibly absent) definition text.
///
/// `def: None` means "known but bodiless" — true of every builtin, and of
/// a macro defined with `define(name)` and no second argument.
struct Entry {
    name: String,
    def: Option<String>,
    next: Option<Box<Entry>>,
}

/// Separate-chaining hash table of macro/builtin names to definitions.
pub struct SymbolTable {
    buckets: Vec<Option<Box<Entry>>>,
}

impl SymbolTable {
    /// Builds an empty table with all 16384 buckets unoccupied.
    pub fn new() -> Self {
        let mut buckets = Vec::with_capacity(HASH_TABLE_SIZE);
        buckets.resize_with(HASH_TABLE_SIZE, || None);
        Self { buckets }
    }

    /// djb2, reduced modulo the bucket count. `usize` wraparound on the
    /// multiply is relied upon, matching the reference's reliance on
    /// `size_t` overflow in the same computation.
    fn hash(name: &str) -> usize {
        let mut h: usize = 5381;
        for &b in name.as_bytes() {
            h = h.wrapping_mul(33) ^ (b as usize);
        }
        h % HASH_TABLE_SIZE
    }

    /// Finds the entry for `name`, if any.
    fn find(&self, name: &str) -> Option<&Entry> {
        let mut cur = self.buckets[Self::hash(name)].as_deref();
        while let Some(node) = cur {
            if node.name == name {
                return Some(node);
            }
            cur = node.next.as_deref();
        }
        None
    }

    fn find_mut(&mut self, name: &str) -> Option<&mut Entry> {
        let mut cur = self.buckets[Self::hash(name)].as_deref_mut();
        while let Some(node) = cur {
            if node.name == name {
                return Some(node);
            }
            cur = node.next.as_deref_mut();
        }
        None
    }

    /// True if `name` is bound to anything, builtin or user macro.
    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// The bound definition text, if `name` is known and has a body.
    pub fn get_def(&self, name: &str) -> Option<&str> {
        self.find(name).and_then(|e| e.def.as_deref())
    }

    /// Inserts `name` if unknown, or overwrites its definition if known.
    /// A new entry is linked in at the head of its bucket.
    pub fn upsert(&mut self, name: &str, def: Option<String>) {
        if let Some(entry) = self.find_mut(name) {
            entry.def = def;
            return;
        }
        let idx = Self::hash(name);
        let node = Box::new(Entry {
            name: name.to_string(),
            def,
            next: self.buckets[idx].take(),
        });
        self.buckets[idx] = Some(node);
    }

    /// Removes `name`'s binding entirely. Returns `true` if it was bound.
    ///
    /// Splices the removed node's predecessor directly to its successor,
    /// including when the removed node was the bucket head — unlike the
    /// reference implementation, which nulls the whole bucket in that case
    /// when the head had a successor, silently losing the rest of the chain.
    pub fn delete(&mut self, name: &str) -> bool {
        let idx = Self::hash(name);
        let mut link = &mut self.buckets[idx];
        loop {
            match link {
                Some(node) if node.name == name => {
                    *link = node.next.take();
                    return true;
                }
                Some(node) => {
                    link = &mut node.next;
                }
                None => return false,
            }
        }
    }

    /// Writes a chain-length histogram to stderr: one line per occupied
    /// chain length under 100, plus a combined ">=100" line if any bucket's
    /// chain is that long.
    pub fn dump_distribution(&self) {
        let mut freq = [0usize; 101];
        for bucket in &self.buckets {
            let mut count = 0usize;
            let mut cur = bucket.as_deref();
            while let Some(node) = cur {
                count += 1;
                cur = node.next.as_deref();
            }
            if count < 100 {
                freq[count] += 1;
            } else {
                freq[100] += 1;
            }
        }
        eprintln!("entries_per_bucket number_of_buckets");
        for (k, &n) in freq.iter().enumerate().take(100) {
            if n > 0 {
                eprintln!("{k} {n}");
            }
        }
        if freq[100] > 0 {
            eprintln!(">=100 {}", freq[100]);
        }
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== BASIC LOOKUP/UPSERT TESTS ====================

    #[test]
    fn unknown_name_is_not_found() {
        let t = SymbolTable::new();
        assert!(!t.contains("define"));
        assert_eq!(t.get_def("define"), None);
    }

    #[test]
    fn upsert_then_lookup_roundtrips() {
        let mut t = SymbolTable::new();
        t.upsert("cool", Some("$1 and $2".to_string()));
        assert!(t.contains("cool"));
        assert_eq!(t.get_def("cool"), Some("$1 and $2"));
    }

    #[test]
    fn builtin_registered_with_no_def_is_still_defined() {
        let mut t = SymbolTable::new();
        t.upsert("define", None);
        assert!(t.contains("define"));
        assert_eq!(t.get_def("define"), None);
    }

    #[test]
    fn redefine_overwrites_existing_entry_in_place() {
        let mut t = SymbolTable::new();
        t.upsert("x", Some("first".to_string()));
        t.upsert("x", Some("second".to_string()));
        assert_eq!(t.get_def("x"), Some("second"));
    }

    #[test]
    fn user_macro_can_shadow_builtin_name() {
        let mut t = SymbolTable::new();
        t.upsert("len", None);
        t.upsert("len", Some("shadowed".to_string()));
        assert_eq!(t.get_def("len"), Some("shadowed"));
    }

    // ==================== DELETE TESTS ====================

    #[test]
    fn delete_removes_a_solitary_entry() {
        let mut t = SymbolTable::new();
        t.upsert("x", Some("y".to_string()));
        assert!(t.delete("x"));
        assert!(!t.contains("x"));
    }

    #[test]
    fn delete_missing_name_returns_false() {
        let mut t = SymbolTable::new();
        assert!(!t.delete("nope"));
    }

    #[test]
    fn delete_preserves_rest_of_chain_when_head_removed() {
        // Force a collision by reusing the same bucket: upsert links new
        // entries at the head, so deleting the most recently inserted name
        // (the head) must not drop the one inserted before it.
        let mut t = SymbolTable::new();
        let idx = SymbolTable::hash("a");
        // Find another name that collides with "a" in the same bucket.
        let mut other = None;
        for i in 0..100_000u32 {
            let candidate = format!("n{i}");
            if SymbolTable::hash(&candidate) == idx && candidate != "a" {
                other = Some(candidate);
                break;
            }
        }
        let other = other.expect("expected to find a colliding name");
        t.upsert("a", Some("1".to_string()));
        t.upsert(&other, Some("2".to_string()));
        // `other` was inserted after "a", so it is the current bucket head.
        assert!(t.delete(&other));
        assert!(t.contains("a"));
        assert_eq!(t.get_def("a"), Some("1"));
    }

    // ==================== DISTRIBUTION TEST ====================

    #[test]
    fn dump_distribution_does_not_panic_on_empty_table() {
        let t = SymbolTable::new();
        t.dump_distribution();
    }
}
