//! Typed collision handlers keyed by pairs of entity kinds
//!
//! Handlers are registered for two concrete entity types and receive them
//! in the declared order, whatever order the scan discovers the pair in.
//! Internally each pair of kinds is stored under a canonical key, and the
//! entry remembers whether the declared order matches that key so dispatch
//! can swap the arguments when needed.

use crate::foundation::math::Rect;
use crate::scene::{Entity, Kind};
use std::any::type_name;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Error type returned by user handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Result type returned by user handlers
pub type HandlerResult = Result<(), HandlerError>;

/// Collision dispatch errors
#[derive(Error, Debug)]
pub enum CollisionError {
    /// A registered handler returned an error
    #[error("collision handler for ({first}, {second}) failed: {source}")]
    Handler {
        /// First declared kind
        first: &'static str,
        /// Second declared kind
        second: &'static str,
        /// Error returned by the handler
        #[source]
        source: HandlerError,
    },

    /// An entity did not have the kind the handler was registered for
    #[error("expected entity of kind {expected}, found {found}")]
    KindMismatch {
        /// Kind the handler declared
        expected: &'static str,
        /// Kind actually supplied
        found: &'static str,
    },
}

/// Unordered pair of kinds in canonical order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KindPair {
    first: Kind,
    second: Kind,
}

impl KindPair {
    /// Canonical pair for two kinds given in any order
    pub fn new(a: Kind, b: Kind) -> Self {
        let (first, second) = if a <= b { (a, b) } else { (b, a) };
        Self { first, second }
    }

    /// Whether `(a, b)` is already in canonical order
    pub fn is_canonical(a: Kind, b: Kind) -> bool {
        a <= b
    }

    /// Lesser kind
    pub fn first(&self) -> Kind {
        self.first
    }

    /// Greater kind
    pub fn second(&self) -> Kind {
        self.second
    }
}

/// Outcome of dispatching one collision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// A handler ran
    Handled,
    /// No handler is registered for the pair
    Unhandled,
}

type Adapter = Box<dyn FnMut(&mut dyn Entity, &mut dyn Entity, &Rect) -> Result<(), CollisionError>>;

struct HandlerEntry {
    /// Declared `(A, B)` order equals the canonical order
    declared_canonical: bool,
    adapter: Adapter,
}

/// Registry of collision handlers
#[derive(Default)]
pub struct HandlerRegistry {
    entries: HashMap<KindPair, HandlerEntry>,
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.entries.keys()).finish()
    }
}

impl HandlerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` for collisions between kinds `A` and `B`
    ///
    /// A later registration for the same unordered pair replaces the earlier
    /// one; returns `true` when that happened.
    pub fn register<A, B, F>(&mut self, mut callback: F) -> bool
    where
        A: Entity,
        B: Entity,
        F: FnMut(&mut A, &mut B, &Rect) -> HandlerResult + 'static,
    {
        let (a, b) = (Kind::of::<A>(), Kind::of::<B>());

        let adapter: Adapter = Box::new(move |first, second, rect| {
            let found = ((*first).kind().name(), (*second).kind().name());
            let first = first
                .as_any_mut()
                .downcast_mut::<A>()
                .ok_or(CollisionError::KindMismatch { expected: type_name::<A>(), found: found.0 })?;
            let second = second
                .as_any_mut()
                .downcast_mut::<B>()
                .ok_or(CollisionError::KindMismatch { expected: type_name::<B>(), found: found.1 })?;

            callback(first, second, rect).map_err(|source| CollisionError::Handler {
                first: type_name::<A>(),
                second: type_name::<B>(),
                source,
            })
        });

        let entry = HandlerEntry {
            declared_canonical: KindPair::is_canonical(a, b),
            adapter,
        };
        let replaced = self.entries.insert(KindPair::new(a, b), entry).is_some();
        if replaced {
            log::debug!("Replaced collision handler for ({}, {})", a.name(), b.name());
        } else {
            log::debug!("Registered collision handler for ({}, {})", a.name(), b.name());
        }
        replaced
    }

    /// Remove the handler for `A` and `B`, in either order
    pub fn unregister<A: Entity, B: Entity>(&mut self) -> bool {
        self.entries.remove(&KindPair::new(Kind::of::<A>(), Kind::of::<B>())).is_some()
    }

    /// Whether a handler exists for the two kinds, in either order
    pub fn contains(&self, a: Kind, b: Kind) -> bool {
        self.entries.contains_key(&KindPair::new(a, b))
    }

    /// Number of registered handlers
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no handlers are registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove every handler
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Run the handler for a colliding pair, if one is registered
    ///
    /// `lhs` and `rhs` are in discovery order; the handler receives them in
    /// its declared order.
    pub fn dispatch(
        &mut self,
        lhs: &mut dyn Entity,
        rhs: &mut dyn Entity,
        rect: &Rect,
    ) -> Result<Dispatch, CollisionError> {
        let (lhs_kind, rhs_kind) = ((*lhs).kind(), (*rhs).kind());
        let Some(entry) = self.entries.get_mut(&KindPair::new(lhs_kind, rhs_kind)) else {
            return Ok(Dispatch::Unhandled);
        };

        if KindPair::is_canonical(lhs_kind, rhs_kind) == entry.declared_canonical {
            (entry.adapter)(lhs, rhs, rect)?;
        } else {
            (entry.adapter)(rhs, lhs, rect)?;
        }
        Ok(Dispatch::Handled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec2;
    use crate::scene::{CircleEntity, Color, RectangleEntity};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn circle() -> CircleEntity {
        CircleEntity::new(5.0)
    }

    fn rectangle() -> RectangleEntity {
        RectangleEntity::new(Vec2::new(10.0, 10.0))
    }

    #[test]
    fn test_kind_pair_is_order_independent() {
        let c = Kind::of::<CircleEntity>();
        let r = Kind::of::<RectangleEntity>();

        assert_eq!(KindPair::new(c, r), KindPair::new(r, c));
        assert_ne!(KindPair::is_canonical(c, r), KindPair::is_canonical(r, c));
        assert!(KindPair::is_canonical(c, c));
    }

    #[test]
    fn test_dispatch_receives_declared_order_in_both_discovery_orders() {
        let mut registry = HandlerRegistry::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&seen);
        registry.register(move |c: &mut CircleEntity, r: &mut RectangleEntity, _: &Rect| {
            log.borrow_mut().push((c.radius, r.size.x));
            Ok(())
        });

        let mut c = circle();
        let mut r = rectangle();
        let rect = Rect::new(0.0, 0.0, 1.0, 1.0);

        assert_eq!(registry.dispatch(&mut c, &mut r, &rect).unwrap(), Dispatch::Handled);
        assert_eq!(registry.dispatch(&mut r, &mut c, &rect).unwrap(), Dispatch::Handled);

        assert_eq!(*seen.borrow(), vec![(5.0, 10.0), (5.0, 10.0)]);
    }

    #[test]
    fn test_declared_order_against_canonical_order() {
        // Register once in each declaration order; both must still route correctly.
        for reversed in [false, true] {
            let mut registry = HandlerRegistry::new();
            if reversed {
                registry.register(|r: &mut RectangleEntity, c: &mut CircleEntity, _: &Rect| {
                    r.fill = Color::RED;
                    c.fill = Color::BLUE;
                    Ok(())
                });
            } else {
                registry.register(|c: &mut CircleEntity, r: &mut RectangleEntity, _: &Rect| {
                    r.fill = Color::RED;
                    c.fill = Color::BLUE;
                    Ok(())
                });
            }

            let mut c = circle();
            let mut r = rectangle();
            registry.dispatch(&mut r, &mut c, &Rect::default()).unwrap();

            assert_eq!(r.fill, Color::RED);
            assert_eq!(c.fill, Color::BLUE);
        }
    }

    #[test]
    fn test_same_kind_pair() {
        let mut registry = HandlerRegistry::new();
        registry.register(|a: &mut CircleEntity, b: &mut CircleEntity, _: &Rect| {
            a.fill = Color::GREEN;
            b.fill = Color::YELLOW;
            Ok(())
        });

        let mut first = circle();
        let mut second = circle();
        registry.dispatch(&mut first, &mut second, &Rect::default()).unwrap();

        assert_eq!(first.fill, Color::GREEN);
        assert_eq!(second.fill, Color::YELLOW);
    }

    #[test]
    fn test_unregistered_pair_is_unhandled() {
        let mut registry = HandlerRegistry::new();
        registry.register(|_: &mut CircleEntity, _: &mut CircleEntity, _: &Rect| Ok(()));

        let mut c = circle();
        let mut r = rectangle();

        assert_eq!(registry.dispatch(&mut c, &mut r, &Rect::default()).unwrap(), Dispatch::Unhandled);
    }

    #[test]
    fn test_last_registration_wins() {
        let mut registry = HandlerRegistry::new();
        let calls = Rc::new(RefCell::new(Vec::new()));

        let first = Rc::clone(&calls);
        assert!(!registry.register(move |_: &mut CircleEntity, _: &mut RectangleEntity, _: &Rect| {
            first.borrow_mut().push("first");
            Ok(())
        }));
        let second = Rc::clone(&calls);
        assert!(registry.register(move |_: &mut RectangleEntity, _: &mut CircleEntity, _: &Rect| {
            second.borrow_mut().push("second");
            Ok(())
        }));

        let mut c = circle();
        let mut r = rectangle();
        registry.dispatch(&mut c, &mut r, &Rect::default()).unwrap();

        assert_eq!(registry.len(), 1);
        assert_eq!(*calls.borrow(), vec!["second"]);
    }

    #[test]
    fn test_handler_error_propagates() {
        let mut registry = HandlerRegistry::new();
        registry.register(|_: &mut CircleEntity, _: &mut RectangleEntity, _: &Rect| Err("boom".into()));

        let mut c = circle();
        let mut r = rectangle();
        let err = registry.dispatch(&mut r, &mut c, &Rect::default()).unwrap_err();

        assert!(matches!(err, CollisionError::Handler { .. }));
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn test_unregister() {
        let mut registry = HandlerRegistry::new();
        registry.register(|_: &mut CircleEntity, _: &mut RectangleEntity, _: &Rect| Ok(()));

        assert!(registry.contains(Kind::of::<RectangleEntity>(), Kind::of::<CircleEntity>()));
        assert!(registry.unregister::<RectangleEntity, CircleEntity>());
        assert!(!registry.unregister::<CircleEntity, RectangleEntity>());
        assert!(registry.is_empty());
    }
}
