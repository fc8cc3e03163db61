use crate::descriptor::BaseType;
use std::rc::Rc;

///The nine kinds of `CONSTANT_MethodHandle` references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleKind {
    GetField,
    GetStatic,
    PutField,
    PutStatic,
    InvokeVirtual,
    InvokeStatic,
    InvokeSpecial,
    NewInvokeSpecial,
    InvokeInterface
}

impl HandleKind {
    pub fn from_tag(tag: u8) -> Option<HandleKind> {
        match tag {
            1 => Some(HandleKind::GetField),
            2 => Some(HandleKind::GetStatic),
            3 => Some(HandleKind::PutField),
            4 => Some(HandleKind::PutStatic),
            5 => Some(HandleKind::InvokeVirtual),
            6 => Some(HandleKind::InvokeStatic),
            7 => Some(HandleKind::InvokeSpecial),
            8 => Some(HandleKind::NewInvokeSpecial),
            9 => Some(HandleKind::InvokeInterface),
            _ => None
        }
    }
    pub fn tag(self) -> u8 {
        match self {
            HandleKind::GetField => 1,
            HandleKind::GetStatic => 2,
            HandleKind::PutField => 3,
            HandleKind::PutStatic => 4,
            HandleKind::InvokeVirtual => 5,
            HandleKind::InvokeStatic => 6,
            HandleKind::InvokeSpecial => 7,
            HandleKind::NewInvokeSpecial => 8,
            HandleKind::InvokeInterface => 9
        }
    }
    ///Whether the handle refers to a field rather than a method.
    pub fn is_field(self) -> bool {
        matches!(self, HandleKind::GetField | HandleKind::GetStatic | HandleKind::PutField | HandleKind::PutStatic)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Handle {
    pub kind: HandleKind,
    pub owner: Rc<str>,
    pub name: Rc<str>,
    pub desc: Rc<str>,
    pub is_interface: bool
}

impl Handle {
    pub fn new<O, N, D>(kind: HandleKind, owner: O, name: N, desc: D, is_interface: bool) -> Handle
            where O: Into<Rc<str>>, N: Into<Rc<str>>, D: Into<Rc<str>> {
        Handle {
            kind,
            owner: owner.into(),
            name: name.into(),
            desc: desc.into(),
            is_interface
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstantDynamic {
    pub name: Rc<str>,
    pub desc: Rc<str>,
    pub bootstrap: Handle,
    pub args: Vec<ConstantValue>
}

impl ConstantDynamic {
    pub fn new<N, D>(name: N, desc: D, bootstrap: Handle, args: Vec<ConstantValue>) -> ConstantDynamic
            where N: Into<Rc<str>>, D: Into<Rc<str>> {
        ConstantDynamic {
            name: name.into(),
            desc: desc.into(),
            bootstrap, args
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeSort {
    ///A base type or `V`.
    Primitive,
    Object,
    Array,
    Method,
    ///A bare internal name such as `java/lang/String`, as used for class literals by some readers.
    Internal
}

///A type held by its descriptor: `I`, `Ljava/lang/String;`, `[J` or `(I)V`.
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub struct Type {
    desc: Rc<str>
}

impl Type {
    pub fn new<T>(desc: T) -> Type where T: Into<Rc<str>> {
        Type {
            desc: desc.into()
        }
    }
    ///Builds a type from an internal name; array names are already descriptors.
    pub fn object_type<T>(name: T) -> Type where T: Into<Rc<str>> {
        let c = name.into();
        let desc = if c.starts_with('[') {
            c
        } else {
            Rc::from(format!("L{};", c))
        };
        Type {
            desc
        }
    }
    pub fn descriptor(&self) -> &str {
        &self.desc
    }
    pub fn sort(&self) -> TypeSort {
        match self.desc.as_bytes().first() {
            Some(b'L') => TypeSort::Object,
            Some(b'[') => TypeSort::Array,
            Some(b'(') => TypeSort::Method,
            Some(&ch) if self.desc.len() == 1 && (ch == b'V' || BaseType::from_char(ch as char).is_some()) => TypeSort::Primitive,
            _ => TypeSort::Internal
        }
    }
    ///The internal name of an object type, e.g. `java/lang/String` for `Ljava/lang/String;`.
    pub fn internal_name(&self) -> Option<&str> {
        match self.sort() {
            TypeSort::Object if self.desc.ends_with(';') => Some(&self.desc[1..self.desc.len() - 1]),
            TypeSort::Internal => Some(&self.desc),
            _ => None
        }
    }
}

///Every kind of constant that can appear as an `ldc` operand, a field initial value,
///a bootstrap argument or an annotation element value.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstantValue {
    Boolean(bool),
    Byte(i8),
    Short(i16),
    Char(u16),
    Integer(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(Rc<str>),
    Type(Type),
    Handle(Handle),
    ConstantDynamic(ConstantDynamic),
    Array(Vec<ConstantValue>),
    ///A constant pool entry the reader did not recognise, kept as its raw tag and bytes.
    Unknown { tag: u8, data: Rc<[u8]> }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_sorts() {
        assert_eq!(Type::new("I").sort(), TypeSort::Primitive);
        assert_eq!(Type::object_type("java/lang/String").descriptor(), "Ljava/lang/String;");
        assert_eq!(Type::object_type("java/lang/String").internal_name(), Some("java/lang/String"));
        assert_eq!(Type::object_type("[I").sort(), TypeSort::Array);
        assert_eq!(Type::object_type("[I").internal_name(), None);
        assert_eq!(Type::new("()V").sort(), TypeSort::Method);
        assert_eq!(Type::new("V").sort(), TypeSort::Primitive);
        assert_eq!(Type::new("java/lang/String").sort(), TypeSort::Internal);
        assert_eq!(Type::new("java/lang/String").internal_name(), Some("java/lang/String"));
        assert_eq!(Type::new("Xgarbage").sort(), TypeSort::Internal);
        assert_eq!(Type::new("").sort(), TypeSort::Internal);
    }

    #[test]
    fn handle_tags() {
        for tag in 1..=9 {
            assert_eq!(HandleKind::from_tag(tag).map(HandleKind::tag), Some(tag));
        }
        assert_eq!(HandleKind::from_tag(0), None);
        assert!(HandleKind::PutStatic.is_field());
        assert!(!HandleKind::NewInvokeSpecial.is_field());
    }
}
