//! Field and method descriptors as an explicit parse tree.
//!
//! Descriptors are never rewritten textually: they are parsed, the class references in the
//! tree are mapped, and the tree is printed again. A tree can only print as a valid descriptor.
use crate::error::{RemapError, Result};
use std::{fmt, rc::Rc};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseType {
    Byte,
    Char,
    Double,
    Float,
    Int,
    Long,
    Short,
    Boolean
}

impl BaseType {
    pub fn from_char(ch: char) -> Option<BaseType> {
        match ch {
            'B' => Some(BaseType::Byte),
            'C' => Some(BaseType::Char),
            'D' => Some(BaseType::Double),
            'F' => Some(BaseType::Float),
            'I' => Some(BaseType::Int),
            'J' => Some(BaseType::Long),
            'S' => Some(BaseType::Short),
            'Z' => Some(BaseType::Boolean),
            _ => None
        }
    }
    pub fn descriptor(self) -> char {
        match self {
            BaseType::Byte => 'B',
            BaseType::Char => 'C',
            BaseType::Double => 'D',
            BaseType::Float => 'F',
            BaseType::Int => 'I',
            BaseType::Long => 'J',
            BaseType::Short => 'S',
            BaseType::Boolean => 'Z'
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ElementType {
    Base(BaseType),
    Object(Rc<str>)
}

///A field type: an element type wrapped in `dimensions` array levels.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeDescriptor {
    pub dimensions: u8,
    pub element: ElementType
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReturnType {
    Void,
    Type(TypeDescriptor)
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodDescriptor {
    pub parameters: Vec<TypeDescriptor>,
    pub result: ReturnType
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Descriptor {
    Field(TypeDescriptor),
    Method(MethodDescriptor)
}

impl TypeDescriptor {
    pub fn new(dimensions: u8, element: ElementType) -> TypeDescriptor {
        TypeDescriptor {
            dimensions, element
        }
    }
    pub fn object<T>(name: T) -> TypeDescriptor where T: Into<Rc<str>> {
        TypeDescriptor::new(0, ElementType::Object(name.into()))
    }
    pub fn parse(data: &str) -> Result<TypeDescriptor> {
        let mut parser = DescriptorParser::new(data);
        let ty = parser.parse_type()?;
        parser.finish()?;
        Ok(ty)
    }
    pub fn map_classes<F>(&self, f: &mut F) -> Result<TypeDescriptor> where F: FnMut(&str) -> Result<Rc<str>> {
        let element = match &self.element {
            ElementType::Base(base) => ElementType::Base(*base),
            ElementType::Object(name) => ElementType::Object(checked_symbol(f(name)?)?)
        };
        Ok(TypeDescriptor::new(self.dimensions, element))
    }
}

impl MethodDescriptor {
    pub fn parse(data: &str) -> Result<MethodDescriptor> {
        let mut parser = DescriptorParser::new(data);
        let desc = parser.parse_method()?;
        parser.finish()?;
        Ok(desc)
    }
    pub fn map_classes<F>(&self, f: &mut F) -> Result<MethodDescriptor> where F: FnMut(&str) -> Result<Rc<str>> {
        let mut parameters = Vec::with_capacity(self.parameters.len());
        for par in &self.parameters {
            parameters.push(par.map_classes(f)?);
        }
        let result = match &self.result {
            ReturnType::Void => ReturnType::Void,
            ReturnType::Type(ty) => ReturnType::Type(ty.map_classes(f)?)
        };
        Ok(MethodDescriptor {
            parameters, result
        })
    }
}

impl Descriptor {
    ///Parses either form, chosen by the leading `(`.
    pub fn parse(data: &str) -> Result<Descriptor> {
        if data.starts_with('(') {
            MethodDescriptor::parse(data).map(Descriptor::Method)
        } else {
            TypeDescriptor::parse(data).map(Descriptor::Field)
        }
    }
    pub fn map_classes<F>(&self, f: &mut F) -> Result<Descriptor> where F: FnMut(&str) -> Result<Rc<str>> {
        match self {
            Descriptor::Field(ty) => ty.map_classes(f).map(Descriptor::Field),
            Descriptor::Method(md) => md.map_classes(f).map(Descriptor::Method)
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for _ in 0..self.dimensions {
            f.write_str("[")?;
        }
        match &self.element {
            ElementType::Base(base) => write!(f, "{}", base.descriptor()),
            ElementType::Object(name) => write!(f, "L{};", name)
        }
    }
}

impl fmt::Display for ReturnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReturnType::Void => f.write_str("V"),
            ReturnType::Type(ty) => ty.fmt(f)
        }
    }
}

impl fmt::Display for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for par in &self.parameters {
            par.fmt(f)?;
        }
        f.write_str(")")?;
        self.result.fmt(f)
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Descriptor::Field(ty) => ty.fmt(f),
            Descriptor::Method(md) => md.fmt(f)
        }
    }
}

///Characters that would break the descriptor or signature grammar if they appeared inside a class name.
const ILLEGAL_SYMBOL_CHARS: &[char] = &['.', ';', '[', '<', '>', ':'];

///Also rejects empty package segments: a leading, trailing or doubled `/`.
pub(crate) fn is_valid_symbol(name: &str) -> bool {
    !name.is_empty() && !name.contains(ILLEGAL_SYMBOL_CHARS)
        && !name.starts_with('/') && !name.ends_with('/') && !name.contains("//")
}

///Rejects a remapped class name that could not be printed back into a descriptor.
pub(crate) fn checked_symbol(name: Rc<str>) -> Result<Rc<str>> {
    if is_valid_symbol(&name) {
        Ok(name)
    } else {
        Err(RemapError::InvalidSymbol {
            symbol: name.to_string()
        })
    }
}

struct DescriptorParser<'a> {
    data: &'a str,
    pos: usize
}

impl<'a> DescriptorParser<'a> {
    fn new(data: &str) -> DescriptorParser {
        DescriptorParser {
            data,
            pos: 0
        }
    }
    fn error(&self, reason: &'static str) -> RemapError {
        RemapError::InvalidDescriptor {
            descriptor: self.data.to_string(),
            position: self.pos,
            reason
        }
    }
    fn peek(&self) -> Option<u8> {
        self.data.as_bytes().get(self.pos).copied()
    }
    fn finish(&self) -> Result<()> {
        if self.pos == self.data.len() {
            Ok(())
        } else {
            Err(self.error("unexpected trailing characters"))
        }
    }
    fn parse_method(&mut self) -> Result<MethodDescriptor> {
        if self.peek() != Some(b'(') {
            return Err(self.error("expected '('"));
        }
        self.pos += 1;
        let mut parameters = Vec::new();
        loop {
            match self.peek() {
                Some(b')') => {
                    self.pos += 1;
                    break;
                },
                Some(b'V') => return Err(self.error("void is only allowed as a return type")),
                Some(_) => parameters.push(self.parse_type()?),
                None => return Err(self.error("missing ')'"))
            }
        }
        let result = if self.peek() == Some(b'V') {
            self.pos += 1;
            ReturnType::Void
        } else {
            ReturnType::Type(self.parse_type()?)
        };
        Ok(MethodDescriptor {
            parameters, result
        })
    }
    fn parse_type(&mut self) -> Result<TypeDescriptor> {
        let mut dimensions: u8 = 0;
        while self.peek() == Some(b'[') {
            dimensions = dimensions.checked_add(1).ok_or_else(|| self.error("more than 255 array dimensions"))?;
            self.pos += 1;
        }
        let element = match self.peek() {
            Some(b'L') => {
                let start = self.pos + 1;
                let len = self.data[start..].find(';').ok_or_else(|| self.error("unterminated class reference"))?;
                let name = &self.data[start..start + len];
                if !is_valid_symbol(name) {
                    self.pos = start;
                    return Err(self.error("invalid class name"));
                }
                self.pos = start + len + 1;
                ElementType::Object(Rc::from(name))
            },
            Some(ch) => {
                let base = BaseType::from_char(ch as char).ok_or_else(|| self.error("unknown type letter"))?;
                self.pos += 1;
                ElementType::Base(base)
            },
            None => return Err(self.error("unexpected end of descriptor"))
        };
        Ok(TypeDescriptor {
            dimensions, element
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upper(name: &str) -> Result<Rc<str>> {
        Ok(Rc::from(name.to_uppercase()))
    }

    #[test]
    fn parses_field_descriptors() {
        assert_eq!(TypeDescriptor::parse("I").unwrap(), TypeDescriptor::new(0, ElementType::Base(BaseType::Int)));
        assert_eq!(TypeDescriptor::parse("[[Ljava/lang/String;").unwrap(), TypeDescriptor::new(2, ElementType::Object(Rc::from("java/lang/String"))));
        assert_eq!(TypeDescriptor::parse("Lpkg/Outer$Inner;").unwrap(), TypeDescriptor::object("pkg/Outer$Inner"));
    }

    #[test]
    fn parses_method_descriptors() {
        let md = MethodDescriptor::parse("(I[JLjava/lang/Object;)V").unwrap();
        assert_eq!(md.parameters.len(), 3);
        assert_eq!(md.parameters[1], TypeDescriptor::new(1, ElementType::Base(BaseType::Long)));
        assert_eq!(md.result, ReturnType::Void);
        let md = MethodDescriptor::parse("()[Z").unwrap();
        assert!(md.parameters.is_empty());
        assert_eq!(md.result, ReturnType::Type(TypeDescriptor::new(1, ElementType::Base(BaseType::Boolean))));
    }

    #[test]
    fn prints_what_it_parsed() {
        for desc in &["I", "[[[D", "Ljava/lang/Object;", "()V", "(BCDFIJSZ)V", "([Lpkg/A;[[I)Lpkg/B$C;", "(Ljava/util/Map;)[J"] {
            assert_eq!(Descriptor::parse(desc).unwrap().to_string(), *desc);
        }
    }

    #[test]
    fn maps_every_class_reference() {
        let md = Descriptor::parse("([La/b;ILc;)[[Ld/e;").unwrap();
        assert_eq!(md.map_classes(&mut upper).unwrap().to_string(), "([LA/B;ILC;)[[LD/E;");
        let ty = Descriptor::parse("J").unwrap();
        assert_eq!(ty.map_classes(&mut upper).unwrap().to_string(), "J");
    }

    #[test]
    fn rejects_malformed_input() {
        let cases = [
            ("Ljava/lang/String", "unterminated class reference"),
            ("Q", "unknown type letter"),
            ("(I", "missing ')'"),
            ("II", "unexpected trailing characters"),
            ("(V)V", "void is only allowed as a return type"),
            ("V", "unknown type letter"),
            ("[", "unexpected end of descriptor"),
            ("L;", "invalid class name"),
            ("Ljava.lang.String;", "invalid class name"),
            ("()", "unexpected end of descriptor"),
            ("()VV", "unexpected trailing characters"),
            ("", "unexpected end of descriptor"),
        ];
        for (desc, expected) in cases.iter() {
            match Descriptor::parse(desc) {
                Err(RemapError::InvalidDescriptor { reason, .. }) => assert_eq!(reason, *expected, "{}", desc),
                other => panic!("{:?} parsed as {:?}", desc, other)
            }
        }
    }

    #[test]
    fn reports_error_offset() {
        match Descriptor::parse("(IILfoo)V") {
            Err(RemapError::InvalidDescriptor { position, .. }) => assert_eq!(position, 3),
            other => panic!("{:?}", other)
        }
    }

    #[test]
    fn rejects_too_many_dimensions() {
        let desc = format!("{}I", "[".repeat(256));
        assert!(TypeDescriptor::parse(&desc).is_err());
        let desc = format!("{}I", "[".repeat(255));
        assert_eq!(TypeDescriptor::parse(&desc).unwrap().dimensions, 255);
    }

    #[test]
    fn refuses_names_that_break_the_grammar() {
        let ty = TypeDescriptor::object("a/B");
        let err = ty.map_classes(&mut |_: &str| Ok(Rc::from("a;B"))).unwrap_err();
        assert!(matches!(err, RemapError::InvalidSymbol { .. }));
        let err = ty.map_classes(&mut |_: &str| Ok(Rc::from(""))).unwrap_err();
        assert!(matches!(err, RemapError::InvalidSymbol { .. }));
    }
}
