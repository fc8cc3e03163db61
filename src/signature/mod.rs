//! Generic signatures (the `Signature` attribute grammar).
pub mod tree;

use self::tree::*;
use crate::descriptor::BaseType;
use crate::error::{RemapError, Result};
use std::{fmt, rc::Rc};

///Which top-level production a signature string follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatureKind {
    ///Type parameters, superclass and superinterfaces.
    Class,
    ///Type parameters, parameter list, return type and throws clause.
    Method,
    ///A single reference type, as used by fields, record components and local variables.
    Field
}

#[derive(Debug, PartialEq, Clone)]
pub enum Signature {
    Class(ClassSignature),
    Method(MethodSignature),
    Field(ReferenceTypeNode)
}

impl Signature {
    pub fn parse(data: &str, kind: SignatureKind) -> Result<Signature> {
        let mut reader = SignatureReader::new(data);
        let sig = match kind {
            SignatureKind::Class => Signature::Class(reader.read_class_signature()?),
            SignatureKind::Method => Signature::Method(reader.read_method_signature()?),
            SignatureKind::Field => Signature::Field(reader.read_reference_type()?)
        };
        reader.finish()?;
        Ok(sig)
    }
    pub fn kind(&self) -> SignatureKind {
        match self {
            Signature::Class(_) => SignatureKind::Class,
            Signature::Method(_) => SignatureKind::Method,
            Signature::Field(_) => SignatureKind::Field
        }
    }
    pub fn map_classes<F>(&self, f: &mut F) -> Result<Signature> where F: FnMut(&str) -> Result<Rc<str>> {
        match self {
            Signature::Class(cs) => cs.map_classes(f).map(Signature::Class),
            Signature::Method(ms) => ms.map_classes(f).map(Signature::Method),
            Signature::Field(rt) => rt.map_classes(f).map(Signature::Field)
        }
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signature::Class(cs) => cs.fmt(f),
            Signature::Method(ms) => ms.fmt(f),
            Signature::Field(rt) => rt.fmt(f)
        }
    }
}

///Deepest `<...>` nesting accepted. Parsing, remapping and printing all recurse once per level.
pub const MAX_TYPE_ARGUMENT_DEPTH: usize = 64;

pub struct SignatureReader<'a> {
    data: &'a str,
    pos: usize,
    depth: usize
}

impl<'a> SignatureReader<'a> {
    pub fn new(data: &str) -> SignatureReader {
        SignatureReader {
            data,
            pos: 0,
            depth: 0
        }
    }
    fn error(&self, reason: &'static str) -> RemapError {
        RemapError::InvalidSignature {
            signature: self.data.to_string(),
            position: self.pos,
            reason
        }
    }
    fn peek(&self) -> Option<u8> {
        self.data.as_bytes().get(self.pos).copied()
    }
    fn expect(&mut self, ch: u8, reason: &'static str) -> Result<()> {
        if self.peek() == Some(ch) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(reason))
        }
    }
    fn finish(&self) -> Result<()> {
        if self.pos == self.data.len() {
            Ok(())
        } else {
            Err(self.error("unexpected trailing characters"))
        }
    }
    ///Reads up to (not including) the first of `stops`.
    fn read_identifier(&mut self, stops: &[char]) -> Result<Rc<str>> {
        let rest = &self.data[self.pos..];
        let len = rest.find(stops).ok_or_else(|| self.error("unterminated identifier"))?;
        if len == 0 {
            return Err(self.error("empty identifier"));
        }
        self.pos += len;
        Ok(Rc::from(&rest[..len]))
    }
    pub fn read_class_signature(&mut self) -> Result<ClassSignature> {
        let type_parameters = self.read_type_parameters()?;
        let superclass = self.read_class_type()?;
        let mut interfaces = Vec::new();
        while self.peek().is_some() {
            interfaces.push(self.read_class_type()?);
        }
        Ok(ClassSignature {
            type_parameters, superclass, interfaces
        })
    }
    pub fn read_method_signature(&mut self) -> Result<MethodSignature> {
        let type_parameters = self.read_type_parameters()?;
        self.expect(b'(', "expected '('")?;
        let mut parameter_types = Vec::new();
        loop {
            match self.peek() {
                Some(b')') => {
                    self.pos += 1;
                    break;
                },
                Some(_) => parameter_types.push(self.read_java_type()?),
                None => return Err(self.error("missing ')'"))
            }
        }
        let result = if self.peek() == Some(b'V') {
            self.pos += 1;
            None
        } else {
            Some(self.read_java_type()?)
        };
        let mut throws = Vec::new();
        while self.peek() == Some(b'^') {
            self.pos += 1;
            match self.peek() {
                Some(b'L') => throws.push(self.read_class_type()?),
                Some(b'T') => throws.push(self.read_type_variable()?),
                _ => return Err(self.error("expected a class type or type variable after '^'"))
            }
        }
        Ok(MethodSignature {
            type_parameters, parameter_types, result, throws
        })
    }
    fn read_type_parameters(&mut self) -> Result<Vec<TypeParameterNode>> {
        let mut params = Vec::new();
        if self.peek() != Some(b'<') {
            return Ok(params);
        }
        self.pos += 1;
        while self.peek() != Some(b'>') {
            let mut par = TypeParameterNode::new(self.read_identifier(&[':', '>', ';'])?);
            self.expect(b':', "expected ':' after type parameter name")?;
            match self.peek() {
                Some(b'L') | Some(b'T') | Some(b'[') => {
                    par.class_bound = Some(self.read_reference_type()?);
                },
                _ => {}
            }
            while self.peek() == Some(b':') {
                self.pos += 1;
                par.interface_bounds.push(self.read_reference_type()?);
            }
            params.push(par);
            if self.peek().is_none() {
                return Err(self.error("missing '>'"));
            }
        }
        self.pos += 1;
        if params.is_empty() {
            return Err(self.error("empty type parameter list"));
        }
        Ok(params)
    }
    ///A reference type or a base type.
    fn read_java_type(&mut self) -> Result<ReferenceTypeNode> {
        if let Some(base) = self.peek().and_then(|ch| BaseType::from_char(ch as char)) {
            self.pos += 1;
            Ok(ReferenceTypeNode::new(ReferenceTypeData::BaseType(base), 0))
        } else {
            self.read_reference_type()
        }
    }
    pub fn read_reference_type(&mut self) -> Result<ReferenceTypeNode> {
        let mut dimensions: u8 = 0;
        while self.peek() == Some(b'[') {
            dimensions = dimensions.checked_add(1).ok_or_else(|| self.error("more than 255 array dimensions"))?;
            self.pos += 1;
        }
        let mut node = match self.peek() {
            Some(b'L') => self.read_class_type()?,
            Some(b'T') => self.read_type_variable()?,
            Some(ch) if dimensions > 0 => {
                let base = BaseType::from_char(ch as char).ok_or_else(|| self.error("unknown type letter"))?;
                self.pos += 1;
                ReferenceTypeNode::new(ReferenceTypeData::BaseType(base), 0)
            },
            Some(_) => return Err(self.error("expected a reference type")),
            None => return Err(self.error("unexpected end of signature"))
        };
        node.array_dimensions = dimensions;
        Ok(node)
    }
    fn read_type_variable(&mut self) -> Result<ReferenceTypeNode> {
        self.expect(b'T', "expected 'T'")?;
        let name = self.read_identifier(&[';', '<', '>', '.', ':'])?;
        self.expect(b';', "unterminated type variable")?;
        Ok(ReferenceTypeNode::new_type_var(name))
    }
    fn read_class_type(&mut self) -> Result<ReferenceTypeNode> {
        self.expect(b'L', "expected a class type")?;
        let mut cts = Vec::new();
        loop {
            let name = self.read_identifier(&[';', '<', '.', '>', ':'])?;
            let type_arguments = self.read_type_arguments()?;
            cts.push(SimpleClassTypeSignature {
                name, type_arguments
            });
            match self.peek() {
                Some(b'.') => self.pos += 1,
                Some(b';') => {
                    self.pos += 1;
                    break;
                },
                _ => return Err(self.error("unterminated class type"))
            }
        }
        Ok(ReferenceTypeNode::new(ReferenceTypeData::ClassType(cts), 0))
    }
    fn read_type_arguments(&mut self) -> Result<Vec<TypeArgument>> {
        let mut args = Vec::new();
        if self.peek() != Some(b'<') {
            return Ok(args);
        }
        if self.depth == MAX_TYPE_ARGUMENT_DEPTH {
            return Err(self.error("type arguments nested too deeply"));
        }
        self.depth += 1;
        self.pos += 1;
        loop {
            let arg = match self.peek() {
                Some(b'>') => break,
                Some(b'*') => {
                    self.pos += 1;
                    TypeArgument {
                        constraint: TypeConstraintKind::Unbound,
                        value: None
                    }
                },
                Some(b'+') => {
                    self.pos += 1;
                    TypeArgument {
                        constraint: TypeConstraintKind::Extends,
                        value: Some(self.read_reference_type()?)
                    }
                },
                Some(b'-') => {
                    self.pos += 1;
                    TypeArgument {
                        constraint: TypeConstraintKind::Super,
                        value: Some(self.read_reference_type()?)
                    }
                },
                Some(_) => TypeArgument {
                    constraint: TypeConstraintKind::Exact,
                    value: Some(self.read_reference_type()?)
                },
                None => return Err(self.error("missing '>'"))
            };
            args.push(arg);
        }
        self.pos += 1;
        self.depth -= 1;
        if args.is_empty() {
            return Err(self.error("empty type argument list"));
        }
        Ok(args)
    }
}
