use crate::descriptor::{checked_symbol, BaseType};
use crate::error::Result;
use std::{fmt, rc::Rc};


#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum TypeConstraintKind {
    ///`*`
    Unbound,
    ///`+`
    Extends,
    ///`-`
    Super,
    Exact
}

#[derive(Debug, PartialEq, Clone)]
pub struct TypeParameterNode {
    pub identifier: Rc<str>,
    pub class_bound: Option<ReferenceTypeNode>,
    pub interface_bounds: Vec<ReferenceTypeNode>
}

impl TypeParameterNode {
    pub fn new(identifier: Rc<str>) -> TypeParameterNode {
        TypeParameterNode {
            identifier,
            class_bound: None,
            interface_bounds: Vec::new()
        }
    }
    fn map_classes<F>(&self, f: &mut F) -> Result<TypeParameterNode> where F: FnMut(&str) -> Result<Rc<str>> {
        let class_bound = match &self.class_bound {
            Some(bound) => Some(bound.map_classes(f)?),
            None => None
        };
        Ok(TypeParameterNode {
            identifier: self.identifier.clone(),
            class_bound,
            interface_bounds: map_all(&self.interface_bounds, f)?
        })
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct ReferenceTypeNode {
    pub data: ReferenceTypeData,
    pub array_dimensions: u8
}

#[derive(Debug, PartialEq, Clone)]
pub enum ReferenceTypeData {
    ///Type variables name a generic parameter, not a class, and are never remapped.
    TypeVariable(Rc<str>),
    ///The outermost class first, followed by each `.Inner` suffix.
    ClassType(Vec<SimpleClassTypeSignature>),
    BaseType(BaseType)
}

#[derive(Debug, PartialEq, Clone)]
pub struct SimpleClassTypeSignature {
    pub name: Rc<str>,
    pub type_arguments: Vec<TypeArgument>
}

#[derive(Debug, PartialEq, Clone)]
pub struct TypeArgument {
    pub constraint: TypeConstraintKind,
    ///`None` only for `TypeConstraintKind::Unbound`.
    pub value: Option<ReferenceTypeNode>
}

impl ReferenceTypeNode {
    pub fn new(data: ReferenceTypeData, array_dimensions: u8) -> ReferenceTypeNode {
        ReferenceTypeNode {
            data, array_dimensions
        }
    }
    pub fn new_class<T>(name: T) -> ReferenceTypeNode where T: Into<Rc<str>> {
        let st = SimpleClassTypeSignature {
            name: name.into(),
            type_arguments: Vec::new()
        };
        ReferenceTypeNode::new(ReferenceTypeData::ClassType(vec![st]), 0)
    }
    pub fn new_type_var<T>(name: T) -> ReferenceTypeNode where T: Into<Rc<str>> {
        ReferenceTypeNode::new(ReferenceTypeData::TypeVariable(name.into()), 0)
    }
    pub fn map_classes<F>(&self, f: &mut F) -> Result<ReferenceTypeNode> where F: FnMut(&str) -> Result<Rc<str>> {
        let data = match &self.data {
            ReferenceTypeData::TypeVariable(name) => ReferenceTypeData::TypeVariable(name.clone()),
            ReferenceTypeData::BaseType(ty) => ReferenceTypeData::BaseType(*ty),
            ReferenceTypeData::ClassType(cts) => ReferenceTypeData::ClassType(map_class_type(cts, f)?)
        };
        Ok(ReferenceTypeNode::new(data, self.array_dimensions))
    }
}

///Remaps `Outer<..>.Inner<..>` chains. Each inner segment is looked up by its full binary
///name (`Outer$Inner`) and its new simple name is whatever follows the remapped outer name,
///or the last `$` or `/` separated segment when it is no longer nested in it.
fn map_class_type<F>(cts: &[SimpleClassTypeSignature], f: &mut F) -> Result<Vec<SimpleClassTypeSignature>>
        where F: FnMut(&str) -> Result<Rc<str>> {
    let mut out = Vec::with_capacity(cts.len());
    let mut full_name = String::new();
    let mut remapped_full: Rc<str> = Rc::from("");
    for (i, st) in cts.iter().enumerate() {
        let name = if i == 0 {
            full_name.push_str(&st.name);
            remapped_full = checked_symbol(f(&full_name)?)?;
            remapped_full.clone()
        } else {
            let remapped_outer = format!("{}$", remapped_full);
            full_name.push('$');
            full_name.push_str(&st.name);
            remapped_full = checked_symbol(f(&full_name)?)?;
            let simple = if remapped_full.starts_with(&remapped_outer) && remapped_full.len() > remapped_outer.len() {
                &remapped_full[remapped_outer.len()..]
            } else {
                remapped_full.rsplit(|c: char| c == '$' || c == '/').next().unwrap_or(&remapped_full[..])
            };
            checked_symbol(Rc::from(simple))?
        };
        let mut type_arguments = Vec::with_capacity(st.type_arguments.len());
        for arg in &st.type_arguments {
            let value = match &arg.value {
                Some(v) => Some(v.map_classes(f)?),
                None => None
            };
            type_arguments.push(TypeArgument {
                constraint: arg.constraint,
                value
            });
        }
        out.push(SimpleClassTypeSignature {
            name, type_arguments
        });
    }
    Ok(out)
}

fn map_all<F>(nodes: &[ReferenceTypeNode], f: &mut F) -> Result<Vec<ReferenceTypeNode>> where F: FnMut(&str) -> Result<Rc<str>> {
    nodes.iter().map(|n| n.map_classes(f)).collect()
}

#[derive(Debug, PartialEq, Clone)]
pub struct ClassSignature {
    pub type_parameters: Vec<TypeParameterNode>,
    pub superclass: ReferenceTypeNode,
    pub interfaces: Vec<ReferenceTypeNode>
}

impl ClassSignature {
    pub fn map_classes<F>(&self, f: &mut F) -> Result<ClassSignature> where F: FnMut(&str) -> Result<Rc<str>> {
        let type_parameters = self.type_parameters.iter().map(|p| p.map_classes(f)).collect::<Result<Vec<_>>>()?;
        Ok(ClassSignature {
            type_parameters,
            superclass: self.superclass.map_classes(f)?,
            interfaces: map_all(&self.interfaces, f)?
        })
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct MethodSignature {
    pub type_parameters: Vec<TypeParameterNode>,
    pub parameter_types: Vec<ReferenceTypeNode>,
    ///`None` for `V`.
    pub result: Option<ReferenceTypeNode>,
    pub throws: Vec<ReferenceTypeNode>
}

impl MethodSignature {
    pub fn map_classes<F>(&self, f: &mut F) -> Result<MethodSignature> where F: FnMut(&str) -> Result<Rc<str>> {
        let type_parameters = self.type_parameters.iter().map(|p| p.map_classes(f)).collect::<Result<Vec<_>>>()?;
        let parameter_types = map_all(&self.parameter_types, f)?;
        let result = match &self.result {
            Some(r) => Some(r.map_classes(f)?),
            None => None
        };
        Ok(MethodSignature {
            type_parameters, parameter_types, result,
            throws: map_all(&self.throws, f)?
        })
    }
}

impl fmt::Display for TypeParameterNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.identifier)?;
        if let Some(bound) = &self.class_bound {
            bound.fmt(f)?;
        }
        for itf in &self.interface_bounds {
            write!(f, ":{}", itf)?;
        }
        Ok(())
    }
}

impl fmt::Display for ReferenceTypeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for _ in 0..self.array_dimensions {
            f.write_str("[")?;
        }
        match &self.data {
            ReferenceTypeData::TypeVariable(name) => write!(f, "T{};", name),
            ReferenceTypeData::BaseType(ty) => write!(f, "{}", ty.descriptor()),
            ReferenceTypeData::ClassType(cts) => {
                f.write_str("L")?;
                for (i, st) in cts.iter().enumerate() {
                    if i > 0 {
                        f.write_str(".")?;
                    }
                    f.write_str(&st.name)?;
                    if !st.type_arguments.is_empty() {
                        f.write_str("<")?;
                        for arg in &st.type_arguments {
                            arg.fmt(f)?;
                        }
                        f.write_str(">")?;
                    }
                }
                f.write_str(";")
            }
        }
    }
}

impl fmt::Display for TypeArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.constraint {
            TypeConstraintKind::Unbound => return f.write_str("*"),
            TypeConstraintKind::Extends => f.write_str("+")?,
            TypeConstraintKind::Super => f.write_str("-")?,
            TypeConstraintKind::Exact => {}
        }
        match &self.value {
            Some(v) => v.fmt(f),
            None => Ok(())
        }
    }
}

fn fmt_type_parameters(params: &[TypeParameterNode], f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if !params.is_empty() {
        f.write_str("<")?;
        for par in params {
            write!(f, "{}", par)?;
        }
        f.write_str(">")?;
    }
    Ok(())
}

impl fmt::Display for ClassSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_type_parameters(&self.type_parameters, f)?;
        self.superclass.fmt(f)?;
        for itf in &self.interfaces {
            itf.fmt(f)?;
        }
        Ok(())
    }
}

impl fmt::Display for MethodSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_type_parameters(&self.type_parameters, f)?;
        f.write_str("(")?;
        for par in &self.parameter_types {
            par.fmt(f)?;
        }
        f.write_str(")")?;
        match &self.result {
            Some(r) => r.fmt(f)?,
            None => f.write_str("V")?
        }
        for xc in &self.throws {
            write!(f, "^{}", xc)?;
        }
        Ok(())
    }
}
