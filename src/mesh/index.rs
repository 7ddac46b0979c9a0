//! Index types for mesh elements.
//!
//! Type-safe index wrappers for vertices, half-edges, edges and faces. The
//! indices are generic over the underlying integer type so small meshes can
//! use `u16` and very large ones `u64`.

use std::fmt::{self, Debug};
use std::hash::Hash;

/// Trait for integer types that can back a mesh index.
pub trait MeshIndex:
    Copy + Clone + Eq + PartialEq + Ord + PartialOrd + Hash + Debug + Send + Sync + 'static
{
    /// The maximum valid index value.
    const MAX: Self;

    /// A sentinel value representing an invalid/null index.
    const INVALID: Self;

    /// Convert from usize to this index type.
    ///
    /// Overflow is only checked in debug builds; use
    /// [`MeshIndex::try_from_usize`] where the value is not known to fit.
    fn from_usize(v: usize) -> Self;

    /// Convert from usize, or `None` if `v` is larger than [`MeshIndex::MAX`].
    fn try_from_usize(v: usize) -> Option<Self>;

    /// Convert to usize.
    fn to_usize(self) -> usize;

    /// Check if this is a valid (non-sentinel) index.
    fn is_valid(self) -> bool {
        self != Self::INVALID
    }
}

macro_rules! impl_mesh_index {
    ($($ty:ty),*) => {
        $(
            impl MeshIndex for $ty {
                const MAX: Self = <$ty>::MAX - 1;
                const INVALID: Self = <$ty>::MAX;

                #[inline]
                fn from_usize(v: usize) -> Self {
                    debug_assert!(
                        v as u128 <= <Self as MeshIndex>::MAX as u128,
                        "index {} too large for {}",
                        v,
                        stringify!($ty)
                    );
                    v as $ty
                }

                #[inline]
                fn try_from_usize(v: usize) -> Option<Self> {
                    <$ty>::try_from(v)
                        .ok()
                        .filter(|&x| x <= <Self as MeshIndex>::MAX)
                }

                #[inline]
                fn to_usize(self) -> usize {
                    self as usize
                }
            }
        )*
    };
}

impl_mesh_index!(u16, u32, u64);

/// A type-safe vertex index.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct VertexId<I: MeshIndex = u32>(I);

/// A type-safe half-edge index.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct HalfEdgeId<I: MeshIndex = u32>(I);

/// A type-safe face index.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct FaceId<I: MeshIndex = u32>(I);

/// A type-safe edge index.
///
/// Edge `k` owns the half-edge pair `2k` and `2k + 1`.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct EdgeId<I: MeshIndex = u32>(I);

macro_rules! impl_index_type {
    ($name:ident, $display:literal) => {
        impl<I: MeshIndex> $name<I> {
            /// Create a new index from a raw value.
            #[inline]
            pub fn new(index: usize) -> Self {
                Self(I::from_usize(index))
            }

            /// Create an invalid/null index.
            #[inline]
            pub fn invalid() -> Self {
                Self(I::INVALID)
            }

            /// Get the raw index value.
            #[inline]
            pub fn index(self) -> usize {
                self.0.to_usize()
            }

            /// Check if this is a valid (non-null) index.
            #[inline]
            pub fn is_valid(self) -> bool {
                self.0.is_valid()
            }
        }

        impl<I: MeshIndex> Debug for $name<I> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_valid() {
                    write!(f, "{}({})", $display, self.index())
                } else {
                    write!(f, "{}(INVALID)", $display)
                }
            }
        }

        impl<I: MeshIndex> Default for $name<I> {
            fn default() -> Self {
                Self::invalid()
            }
        }

        impl<I: MeshIndex> From<usize> for $name<I> {
            fn from(v: usize) -> Self {
                Self::new(v)
            }
        }
    };
}

impl_index_type!(VertexId, "V");
impl_index_type!(HalfEdgeId, "HE");
impl_index_type!(FaceId, "F");
impl_index_type!(EdgeId, "E");

impl<I: MeshIndex> HalfEdgeId<I> {
    /// The edge this half-edge belongs to.
    #[inline]
    pub fn edge(self) -> EdgeId<I> {
        EdgeId::new(self.index() / 2)
    }
}

impl<I: MeshIndex> EdgeId<I> {
    /// One of the two half-edges of this edge (`side` 0 or 1).
    #[inline]
    pub fn halfedge(self, side: usize) -> HalfEdgeId<I> {
        debug_assert!(side < 2);
        HalfEdgeId::new(self.index() * 2 + side)
    }
}
