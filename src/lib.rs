//! Consistent renaming of classes, members, descriptors, signatures and constants
//! inside a class file model.
//!
//! A [`Remapper`] supplies the renaming decisions; [`ClassRemapper`] walks a
//! [`tree::ClassNode`] and produces a new node with every symbolic reference rewritten.
pub mod opcodes;
pub mod error;
pub mod descriptor;
pub mod signature;
pub mod constant;
pub mod remapper;
pub mod value;
pub mod inner_class;
#[cfg(feature = "tree")]
pub mod tree;
#[cfg(feature = "tree")]
pub mod class_remapper;

pub use crate::error::{RemapError, Result};
pub use crate::constant::{ConstantValue, ConstantDynamic, Handle, HandleKind, Type};
pub use crate::remapper::{Remapper, SimpleRemapper, PackageRemapper};
pub use crate::signature::SignatureKind;
#[cfg(feature = "tree")]
pub use crate::class_remapper::ClassRemapper;
use bitflags::*;


bitflags! {
    pub struct ClassAccess: u32 {
        const ACC_PUBLIC = 0x1;
        const ACC_FINAL = 0x10;
        const ACC_SUPER = 0x20;
        const ACC_INTERFACE = 0x200;
        const ACC_ABSTRACT = 0x400;
        const ACC_SYNTHETIC = 0x1000;
        const ACC_ANNOTATION = 0x2000;
        const ACC_ENUM = 0x4000;
        const ACC_MODULE = 0x8000;
        const ACC_RECORD = 0x10000;
        const ACC_PSEUDO_DEPRECATED = 0x20000;
    }
}

bitflags! {
    pub struct InnerClassAccess: u32 {
        const ACC_PUBLIC = 0x1;
        const ACC_PRIVATE = 0x2;
        const ACC_PROTECTED = 0x4;
        const ACC_STATIC = 0x8;
        const ACC_FINAL = 0x10;
        const ACC_INTERFACE = 0x200;
        const ACC_ABSTRACT = 0x400;
        const ACC_SYNTHETIC = 0x1000;
        const ACC_ANNOTATION = 0x2000;
        const ACC_ENUM = 0x4000;
    }
}

bitflags! {
    pub struct FieldAccess: u32 {
        const ACC_PUBLIC = 0x1;
        const ACC_PRIVATE = 0x2;
        const ACC_PROTECTED = 0x4;
        const ACC_STATIC = 0x8;
        const ACC_FINAL = 0x10;
        const ACC_VOLATILE = 0x40;
        const ACC_TRANSIENT = 0x80;
        const ACC_SYNTHETIC = 0x1000;
        const ACC_ENUM = 0x4000;
        const ACC_PSEUDO_DEPRECATED = 0x20000;
    }
}

bitflags! {
    pub struct MethodAccess: u32 {
        const ACC_PUBLIC = 0x1;
        const ACC_PRIVATE = 0x2;
        const ACC_PROTECTED = 0x4;
        const ACC_STATIC = 0x8;
        const ACC_FINAL = 0x10;
        const ACC_SYNCHRONIZED = 0x20;
        const ACC_BRIDGE = 0x40;
        const ACC_VARARGS = 0x80;
        const ACC_NATIVE = 0x100;
        const ACC_ABSTRACT = 0x400;
        const ACC_STRICT = 0x800;
        const ACC_SYNTHETIC = 0x1000;
        const ACC_PSEUDO_DEPRECATED = 0x20000;
    }
}

bitflags! {
    pub struct ParameterAccess: u32 {
        const ACC_FINAL = 0x10;
        const ACC_SYNTHETIC = 0x1000;
        const ACC_MANDATED = 0x8000;
    }
}

bitflags! {
    pub struct ModuleFlags: u32 {
        const ACC_OPEN = 0x20;
        const ACC_SYNTHETIC = 0x1000;
        const ACC_MANDATED = 0x8000;
    }
}

bitflags! {
    pub struct RequireFlags: u32 {
        const ACC_TRANSITIVE = 0x20;
        const ACC_STATIC_PHASE = 0x40;
        const ACC_SYNTHETIC = 0x1000;
        const ACC_MANDATED = 0x8000;
    }
}

bitflags! {
    pub struct ExportFlags: u32 {
        const ACC_SYNTHETIC = 0x1000;
        const ACC_MANDATED = 0x8000;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClassVersion {
    pub major: u16,
    pub minor: u16
}

impl ClassVersion {
    pub const V1_5: ClassVersion = ClassVersion::new(49, 0);
    pub const V1_8: ClassVersion = ClassVersion::new(52, 0);
    pub const V9: ClassVersion = ClassVersion::new(53, 0);
    pub const V11: ClassVersion = ClassVersion::new(55, 0);
    pub const V17: ClassVersion = ClassVersion::new(61, 0);
    pub const V21: ClassVersion = ClassVersion::new(65, 0);

    pub const fn new(major: u16, minor: u16) -> ClassVersion {
        ClassVersion {
            major, minor
        }
    }
}

///The newest class file format a `ClassRemapper` is prepared to handle.
///Classes of a newer format may contain constructs this crate does not know how to rename,
///so they are rejected instead of being partially remapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ApiLevel {
    Java8,
    Java9,
    Java10,
    Java11,
    Java16,
    Java17,
    Latest
}

impl ApiLevel {
    pub const LATEST: ApiLevel = ApiLevel::Latest;

    pub fn max_major_version(self) -> u16 {
        match self {
            ApiLevel::Java8 => 52,
            ApiLevel::Java9 => 53,
            ApiLevel::Java10 => 54,
            ApiLevel::Java11 => 55,
            ApiLevel::Java16 => 60,
            ApiLevel::Java17 => 61,
            ApiLevel::Latest => 69
        }
    }
    pub fn supports(self, version: ClassVersion) -> bool {
        version.major <= self.max_major_version()
    }
}

impl Default for ApiLevel {
    fn default() -> Self {
        ApiLevel::LATEST
    }
}

///An abstract token used to represent a position in code.
///The reader assigns the ids; the only useful operation is the equality comparison.
#[derive(PartialEq, Eq, Hash, Clone, Debug, Copy)]
pub struct Label {
    id: u32
}

impl Label {
    pub fn new(id: u32) -> Label {
        Label {
            id
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_level_bounds() {
        assert!(ApiLevel::Java8.supports(ClassVersion::V1_8));
        assert!(!ApiLevel::Java8.supports(ClassVersion::V9));
        assert!(ApiLevel::Java11.supports(ClassVersion::V11));
        assert!(!ApiLevel::Java16.supports(ClassVersion::V17));
        assert!(ApiLevel::LATEST.supports(ClassVersion::V21));
        assert!(ApiLevel::Java9 < ApiLevel::Java17);
    }
}
