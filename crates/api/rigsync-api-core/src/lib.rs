//! rigsync-api-core: shared value types, skeleton arena and write contracts
//! (core, engine-agnostic).

pub mod blend;
pub mod euler;
pub mod skeleton;
pub mod value;
pub mod write_ops;

pub use euler::{Euler, EulerOrder};
pub use skeleton::{Bone, BoneDesc, BoneId, Skeleton, SkeletonDesc, SkeletonError};
pub use value::{Quat, Value, ValueKind, Vec3, QUAT_IDENTITY};
pub use write_ops::{WriteBatch, WriteOp};
