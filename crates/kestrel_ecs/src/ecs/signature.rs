//! # Signatures and Component Kinds
//!
//! Every concrete component type is mapped to a small integer, its
//! [`ComponentKind`], the first time it is used. Kinds are assigned in
//! first-use order from a single process-wide table and never change for the
//! lifetime of the process.
//!
//! A [`Signature`] is a fixed-width bitset over those kinds. Entities carry
//! one describing what they have; systems carry one describing what they
//! require. An entity matches a system when
//! `entity & required == required`.

use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::ops::{BitAnd, BitOr};
use std::sync::OnceLock;

use parking_lot::Mutex;

use crate::error::{EcsError, EcsResult};

/// Maximum number of distinct component kinds per process.
///
/// This is the width of [`Signature`]. Requesting a kind for the
/// `MAX_COMPONENTS + 1`-th distinct type is a configuration error.
pub const MAX_COMPONENTS: usize = 32;

/// Marker trait for ECS components.
///
/// Components are plain data values with no behavior. Anything `'static`
/// can be a component; the trait exists so component types are declared
/// explicitly.
///
/// # Example
///
/// ```rust
/// use kestrel_ecs::Component;
///
/// #[derive(Clone, Copy, Debug, Default, PartialEq)]
/// struct Position {
///     x: f32,
///     y: f32,
/// }
///
/// impl Component for Position {}
/// ```
pub trait Component: 'static {}

/// Stable small integer identifying one component type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentKind(u8);

impl ComponentKind {
    /// Returns the bit index of this kind inside a [`Signature`].
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentKind({})", self.0)
    }
}

/// The process-wide kind table.
struct KindTable {
    /// Assigned kinds by type.
    ids: HashMap<TypeId, ComponentKind>,
    /// Type names, indexed by kind.
    names: Vec<&'static str>,
}

fn kind_table() -> &'static Mutex<KindTable> {
    static TABLE: OnceLock<Mutex<KindTable>> = OnceLock::new();
    TABLE.get_or_init(|| {
        Mutex::new(KindTable {
            ids: HashMap::with_capacity(MAX_COMPONENTS),
            names: Vec::with_capacity(MAX_COMPONENTS),
        })
    })
}

/// Returns the kind of `T`, assigning the next free one on first use.
///
/// # Errors
///
/// Returns [`EcsError::ComponentCapacityExceeded`] if `T` has no kind yet
/// and all [`MAX_COMPONENTS`] kinds are taken.
pub fn try_component_kind<T: Component>() -> EcsResult<ComponentKind> {
    let mut table = kind_table().lock();
    if let Some(&kind) = table.ids.get(&TypeId::of::<T>()) {
        return Ok(kind);
    }

    let next = table.names.len();
    if next >= MAX_COMPONENTS {
        return Err(EcsError::ComponentCapacityExceeded {
            capacity: MAX_COMPONENTS,
        });
    }
    let kind = ComponentKind(u8::try_from(next).map_err(|_| {
        EcsError::ComponentCapacityExceeded {
            capacity: MAX_COMPONENTS,
        }
    })?);

    table.ids.insert(TypeId::of::<T>(), kind);
    table.names.push(type_name::<T>());
    tracing::debug!(component = type_name::<T>(), kind = kind.0, "assigned component kind");
    Ok(kind)
}

/// Returns the kind of `T`, assigning the next free one on first use.
///
/// # Panics
///
/// Panics if the kind table is full. Running out of component kinds is a
/// startup configuration error, not something gameplay code can recover
/// from; raise [`MAX_COMPONENTS`] instead.
#[must_use]
pub fn component_kind<T: Component>() -> ComponentKind {
    match try_component_kind::<T>() {
        Ok(kind) => kind,
        Err(err) => panic!("{err} (while registering {})", type_name::<T>()),
    }
}

/// Returns the number of component kinds assigned so far.
#[must_use]
pub fn component_kind_count() -> usize {
    kind_table().lock().names.len()
}

/// Returns the type name a kind was assigned to, if it has been assigned.
#[must_use]
pub fn component_kind_name(kind: ComponentKind) -> Option<&'static str> {
    kind_table().lock().names.get(kind.index()).copied()
}

/// Fixed-width set of component kinds.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Signature(u32);

impl Signature {
    /// The signature with no kinds set.
    pub const EMPTY: Self = Self(0);

    /// Creates an empty signature.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self::EMPTY
    }

    /// Creates a signature holding exactly the kind of `T`.
    #[must_use]
    pub fn of<T: Component>() -> Self {
        Self::EMPTY.with::<T>()
    }

    /// Returns a copy of this signature with the kind of `T` added.
    #[must_use]
    pub fn with<T: Component>(mut self) -> Self {
        self.set(component_kind::<T>());
        self
    }

    /// Sets the bit for `kind`.
    #[inline]
    pub fn set(&mut self, kind: ComponentKind) {
        self.0 |= 1 << kind.0;
    }

    /// Clears the bit for `kind`.
    #[inline]
    pub fn clear(&mut self, kind: ComponentKind) {
        self.0 &= !(1 << kind.0);
    }

    /// Clears every bit.
    #[inline]
    pub fn reset(&mut self) {
        self.0 = 0;
    }

    /// Tests the bit for `kind`.
    #[inline]
    #[must_use]
    pub const fn test(self, kind: ComponentKind) -> bool {
        self.0 & (1 << kind.0) != 0
    }

    /// Returns `true` if every kind in `required` is also in `self`.
    #[inline]
    #[must_use]
    pub const fn contains(self, required: Self) -> bool {
        self.0 & required.0 == required.0
    }

    /// Number of kinds set.
    #[inline]
    #[must_use]
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Returns `true` if no kind is set.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Raw bits, bit `n` standing for kind `n`.
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }
}

impl BitAnd for Signature {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl BitOr for Signature {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({:#034b})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Mass;
    impl Component for Mass {}

    struct Charge;
    impl Component for Charge {}

    #[test]
    fn test_kind_is_memoized() {
        let first = component_kind::<Mass>();
        let second = component_kind::<Mass>();
        assert_eq!(first, second);
        assert_eq!(component_kind_name(first), Some(type_name::<Mass>()));
    }

    #[test]
    fn test_distinct_types_get_distinct_kinds() {
        assert_ne!(component_kind::<Mass>(), component_kind::<Charge>());
        assert!(component_kind_count() >= 2);
    }

    #[test]
    fn test_signature_set_clear() {
        let kind = component_kind::<Mass>();
        let mut signature = Signature::new();
        assert!(!signature.test(kind));

        signature.set(kind);
        assert!(signature.test(kind));
        assert_eq!(signature.len(), 1);

        signature.clear(kind);
        assert!(signature.is_empty());
    }

    #[test]
    fn test_signature_matching() {
        let required = Signature::of::<Mass>();
        let both = Signature::of::<Mass>().with::<Charge>();
        let charge_only = Signature::of::<Charge>();

        assert!(both.contains(required));
        assert_eq!(both & required, required);
        assert!(!charge_only.contains(required));
        assert!(charge_only.contains(Signature::EMPTY));
        assert_eq!(required | charge_only, both);
    }
}
