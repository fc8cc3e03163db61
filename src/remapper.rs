//! The renaming policy consulted by the remapping engine.
use crate::constant::ConstantValue;
use crate::descriptor::{checked_symbol, Descriptor};
use crate::error::Result;
use crate::signature::{Signature, SignatureKind};
use crate::value;
use std::{collections::HashMap, rc::Rc};

pub const CONSTRUCTOR_NAME: &str = "<init>";
pub const STATIC_INITIALIZER_NAME: &str = "<clinit>";
pub const MODULE_INFO_NAME: &str = "module-info";

///Supplies the renaming decisions. Every method has a default, so an implementation only
///overrides the hooks it cares about; the composite methods (`map_type`, `map_descriptor`,
///`map_signature`, `map_value`) are expressed in terms of `map_symbol` and the member hooks.
///
///Implementations must be pure with respect to the class being remapped: the order in which
///the hooks are called is not part of the contract. Errors returned from a hook abort the
///traversal and reach the caller unchanged.
pub trait Remapper {
    ///Renames a class or interface given by its internal name.
    fn map_symbol(&self, name: &str) -> Result<Rc<str>> {
        Ok(Rc::from(name))
    }
    ///Renames an internal name that may also be an array descriptor, as found in
    ///instruction operands and method owners.
    fn map_type(&self, name: &str) -> Result<Rc<str>> {
        if name.starts_with('[') {
            self.map_descriptor(name)
        } else {
            checked_symbol(self.map_symbol(name)?)
        }
    }
    ///Never called for `<init>` and `<clinit>`; see [`method_name`].
    fn map_method_name(&self, _owner: &str, name: &str, _desc: &str) -> Result<Rc<str>> {
        Ok(Rc::from(name))
    }
    fn map_field_name(&self, _owner: &str, name: &str, _desc: &str) -> Result<Rc<str>> {
        Ok(Rc::from(name))
    }
    fn map_record_component_name(&self, _owner: &str, name: &str, _desc: &str) -> Result<Rc<str>> {
        Ok(Rc::from(name))
    }
    ///Renames an invokedynamic call site or a dynamically-computed constant, neither of which has an owner.
    fn map_invoke_dynamic_method_name(&self, name: &str, _desc: &str) -> Result<Rc<str>> {
        Ok(Rc::from(name))
    }
    fn map_annotation_attribute_name(&self, _desc: &str, name: &str) -> Result<Rc<str>> {
        Ok(Rc::from(name))
    }
    fn map_module_name(&self, name: &str) -> Result<Rc<str>> {
        Ok(Rc::from(name))
    }
    fn map_package_name(&self, name: &str) -> Result<Rc<str>> {
        Ok(Rc::from(name))
    }
    ///Maps a field or method descriptor through `map_symbol`.
    fn map_descriptor(&self, desc: &str) -> Result<Rc<str>> {
        let mapped = Descriptor::parse(desc)?.map_classes(&mut |name: &str| self.map_symbol(name))?;
        Ok(Rc::from(mapped.to_string()))
    }
    ///Maps a generic signature through `map_symbol`.
    fn map_signature(&self, signature: &str, kind: SignatureKind) -> Result<Rc<str>> {
        let mapped = Signature::parse(signature, kind)?.map_classes(&mut |name: &str| self.map_symbol(name))?;
        Ok(Rc::from(mapped.to_string()))
    }
    fn map_value(&self, value: &ConstantValue) -> Result<ConstantValue> {
        value::remap_value(self, value)
    }
}

///Renames a method, leaving instance and static initializers alone whatever the policy says.
pub fn method_name<R>(remapper: &R, owner: &str, name: &str, desc: &str) -> Result<Rc<str>> where R: Remapper + ?Sized {
    if name == CONSTRUCTOR_NAME || name == STATIC_INITIALIZER_NAME {
        Ok(Rc::from(name))
    } else {
        remapper.map_method_name(owner, name, desc)
    }
}

///A policy backed by exact-match tables. Names without an entry are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct SimpleRemapper {
    classes: HashMap<Rc<str>, Rc<str>>,
    methods: HashMap<String, Rc<str>>,
    fields: HashMap<String, Rc<str>>,
    call_sites: HashMap<String, Rc<str>>,
    annotation_attributes: HashMap<String, Rc<str>>,
    modules: HashMap<Rc<str>, Rc<str>>,
    packages: HashMap<Rc<str>, Rc<str>>
}

fn method_key(owner: &str, name: &str, desc: &str) -> String {
    format!("{}.{}{}", owner, name, desc)
}

fn field_key(owner: &str, name: &str) -> String {
    format!("{}.{}", owner, name)
}

impl SimpleRemapper {
    pub fn new() -> SimpleRemapper {
        SimpleRemapper::default()
    }
    pub fn with_class<F, T>(mut self, from: F, to: T) -> SimpleRemapper where F: Into<Rc<str>>, T: Into<Rc<str>> {
        self.classes.insert(from.into(), to.into());
        self
    }
    ///Methods are keyed by owner, name and descriptor so overloads can be renamed independently.
    pub fn with_method<T>(mut self, owner: &str, name: &str, desc: &str, to: T) -> SimpleRemapper where T: Into<Rc<str>> {
        self.methods.insert(method_key(owner, name, desc), to.into());
        self
    }
    pub fn with_field<T>(mut self, owner: &str, name: &str, to: T) -> SimpleRemapper where T: Into<Rc<str>> {
        self.fields.insert(field_key(owner, name), to.into());
        self
    }
    pub fn with_call_site<T>(mut self, name: &str, desc: &str, to: T) -> SimpleRemapper where T: Into<Rc<str>> {
        self.call_sites.insert(method_key("", name, desc), to.into());
        self
    }
    ///Annotation elements are keyed by the annotation's descriptor, e.g. `Lpkg/Marker;`.
    pub fn with_annotation_attribute<T>(mut self, desc: &str, name: &str, to: T) -> SimpleRemapper where T: Into<Rc<str>> {
        self.annotation_attributes.insert(field_key(desc, name), to.into());
        self
    }
    pub fn with_module<F, T>(mut self, from: F, to: T) -> SimpleRemapper where F: Into<Rc<str>>, T: Into<Rc<str>> {
        self.modules.insert(from.into(), to.into());
        self
    }
    pub fn with_package<F, T>(mut self, from: F, to: T) -> SimpleRemapper where F: Into<Rc<str>>, T: Into<Rc<str>> {
        self.packages.insert(from.into(), to.into());
        self
    }
}

fn lookup(table: &HashMap<Rc<str>, Rc<str>>, name: &str) -> Rc<str> {
    table.get(name).cloned().unwrap_or_else(|| Rc::from(name))
}

impl Remapper for SimpleRemapper {
    fn map_symbol(&self, name: &str) -> Result<Rc<str>> {
        Ok(lookup(&self.classes, name))
    }
    fn map_method_name(&self, owner: &str, name: &str, desc: &str) -> Result<Rc<str>> {
        Ok(self.methods.get(&method_key(owner, name, desc)).cloned().unwrap_or_else(|| Rc::from(name)))
    }
    fn map_field_name(&self, owner: &str, name: &str, _desc: &str) -> Result<Rc<str>> {
        Ok(self.fields.get(&field_key(owner, name)).cloned().unwrap_or_else(|| Rc::from(name)))
    }
    ///A record component shares its name with the private field backing it.
    fn map_record_component_name(&self, owner: &str, name: &str, desc: &str) -> Result<Rc<str>> {
        self.map_field_name(owner, name, desc)
    }
    fn map_invoke_dynamic_method_name(&self, name: &str, desc: &str) -> Result<Rc<str>> {
        Ok(self.call_sites.get(&method_key("", name, desc)).cloned().unwrap_or_else(|| Rc::from(name)))
    }
    fn map_annotation_attribute_name(&self, desc: &str, name: &str) -> Result<Rc<str>> {
        Ok(self.annotation_attributes.get(&field_key(desc, name)).cloned().unwrap_or_else(|| Rc::from(name)))
    }
    fn map_module_name(&self, name: &str) -> Result<Rc<str>> {
        Ok(lookup(&self.modules, name))
    }
    fn map_package_name(&self, name: &str) -> Result<Rc<str>> {
        Ok(lookup(&self.packages, name))
    }
}

///Moves a package, its subpackages and every class in them under a new package name.
///Package names use the internal form (`com/example`); an empty `from` means the unnamed package.
#[derive(Debug, Clone)]
pub struct PackageRemapper {
    from: Rc<str>,
    to: Rc<str>
}

impl PackageRemapper {
    pub fn new<F, T>(from: F, to: T) -> PackageRemapper where F: Into<Rc<str>>, T: Into<Rc<str>> {
        PackageRemapper {
            from: from.into(),
            to: to.into()
        }
    }
    fn rebase(&self, name: &str) -> Option<String> {
        if self.from.is_empty() {
            return None;
        }
        let rest = name.strip_prefix(&*self.from)?;
        if !rest.is_empty() && !rest.starts_with('/') {
            None
        } else if self.to.is_empty() {
            Some(rest.trim_start_matches('/').to_string())
        } else {
            Some(format!("{}{}", self.to, rest))
        }
    }
}

impl Remapper for PackageRemapper {
    ///The module descriptor class is never moved.
    fn map_symbol(&self, name: &str) -> Result<Rc<str>> {
        if name == MODULE_INFO_NAME {
            return Ok(Rc::from(name));
        }
        if self.from.is_empty() {
            if !name.contains('/') && !self.to.is_empty() {
                return Ok(Rc::from(format!("{}/{}", self.to, name)));
            }
            return Ok(Rc::from(name));
        }
        match self.rebase(name) {
            Some(renamed) if name.len() > self.from.len() => Ok(Rc::from(renamed)),
            _ => Ok(Rc::from(name))
        }
    }
    fn map_package_name(&self, name: &str) -> Result<Rc<str>> {
        if self.from.is_empty() && name.is_empty() {
            return Ok(self.to.clone());
        }
        Ok(self.rebase(name).map(Rc::from).unwrap_or_else(|| Rc::from(name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RemapError;

    struct Identity;
    impl Remapper for Identity {}

    struct Upper;
    impl Remapper for Upper {
        fn map_symbol(&self, name: &str) -> Result<Rc<str>> {
            Ok(Rc::from(name.to_uppercase()))
        }
        fn map_method_name(&self, _owner: &str, name: &str, _desc: &str) -> Result<Rc<str>> {
            Ok(Rc::from(name.to_uppercase()))
        }
    }

    struct Failing;
    impl Remapper for Failing {
        fn map_symbol(&self, name: &str) -> Result<Rc<str>> {
            Err(RemapError::policy(format!("no mapping for {}", name)))
        }
    }

    #[test]
    fn defaults_are_identity() {
        assert_eq!(&*Identity.map_symbol("a/B").unwrap(), "a/B");
        assert_eq!(&*Identity.map_descriptor("([La/B;I)La/C;").unwrap(), "([La/B;I)La/C;");
        assert_eq!(&*Identity.map_signature("Ljava/util/List<TT;>;", SignatureKind::Field).unwrap(), "Ljava/util/List<TT;>;");
        assert_eq!(&*Identity.map_method_name("a/B", "run", "()V").unwrap(), "run");
        assert_eq!(&*Identity.map_module_name("java.base").unwrap(), "java.base");
    }

    #[test]
    fn composite_hooks_go_through_map_symbol() {
        assert_eq!(&*Upper.map_descriptor("(La/b;[Lc/d;)V").unwrap(), "(LA/B;[LC/D;)V");
        assert_eq!(&*Upper.map_type("a/b").unwrap(), "A/B");
        assert_eq!(&*Upper.map_type("[[La/b;").unwrap(), "[[LA/B;");
        assert_eq!(&*Upper.map_signature("<T:La/b;>La/c<TT;>;", SignatureKind::Class).unwrap(), "<T:LA/B;>LA/C<TT;>;");
    }

    #[test]
    fn initializers_keep_their_names() {
        assert_eq!(&*method_name(&Upper, "a/b", "<init>", "()V").unwrap(), "<init>");
        assert_eq!(&*method_name(&Upper, "a/b", "<clinit>", "()V").unwrap(), "<clinit>");
        assert_eq!(&*method_name(&Upper, "a/b", "run", "()V").unwrap(), "RUN");
    }

    #[test]
    fn malformed_descriptor_is_fatal() {
        assert!(matches!(Identity.map_descriptor("(La/b"), Err(RemapError::InvalidDescriptor { .. })));
        assert!(matches!(Identity.map_signature("La/b", SignatureKind::Field), Err(RemapError::InvalidSignature { .. })));
    }

    #[test]
    fn policy_errors_propagate() {
        let err = Failing.map_descriptor("(La/B;)V").unwrap_err();
        assert!(matches!(err, RemapError::Policy(_)));
        assert_eq!(err.to_string(), "no mapping for a/B");
    }

    #[test]
    fn simple_remapper_tables() {
        let remapper = SimpleRemapper::new()
            .with_class("pkg/C", "new/pkg/C")
            .with_method("pkg/C", "run", "(I)V", "go")
            .with_field("pkg/C", "count", "total")
            .with_call_site("apply", "()Ljava/util/function/Function;", "lambda")
            .with_annotation_attribute("Lpkg/Marker;", "value", "names")
            .with_module("pkg.mod", "new.mod")
            .with_package("pkg", "new/pkg");
        assert_eq!(&*remapper.map_symbol("pkg/C").unwrap(), "new/pkg/C");
        assert_eq!(&*remapper.map_symbol("pkg/D").unwrap(), "pkg/D");
        assert_eq!(&*remapper.map_method_name("pkg/C", "run", "(I)V").unwrap(), "go");
        assert_eq!(&*remapper.map_method_name("pkg/C", "run", "(J)V").unwrap(), "run");
        assert_eq!(&*remapper.map_method_name("pkg/D", "run", "(I)V").unwrap(), "run");
        assert_eq!(&*remapper.map_field_name("pkg/C", "count", "I").unwrap(), "total");
        assert_eq!(&*remapper.map_record_component_name("pkg/C", "count", "I").unwrap(), "total");
        assert_eq!(&*remapper.map_invoke_dynamic_method_name("apply", "()Ljava/util/function/Function;").unwrap(), "lambda");
        assert_eq!(&*remapper.map_annotation_attribute_name("Lpkg/Marker;", "value").unwrap(), "names");
        assert_eq!(&*remapper.map_annotation_attribute_name("Lpkg/Other;", "value").unwrap(), "value");
        assert_eq!(&*remapper.map_module_name("pkg.mod").unwrap(), "new.mod");
        assert_eq!(&*remapper.map_package_name("pkg").unwrap(), "new/pkg");
        assert_eq!(&*remapper.map_descriptor("(Lpkg/C;)[Lpkg/C;").unwrap(), "(Lnew/pkg/C;)[Lnew/pkg/C;");
    }

    #[test]
    fn package_remapper_moves_subtrees() {
        let remapper = PackageRemapper::new("com/example", "org/sample");
        assert_eq!(&*remapper.map_symbol("com/example/Main").unwrap(), "org/sample/Main");
        assert_eq!(&*remapper.map_symbol("com/example/util/Io$1").unwrap(), "org/sample/util/Io$1");
        assert_eq!(&*remapper.map_symbol("com/examples/Main").unwrap(), "com/examples/Main");
        assert_eq!(&*remapper.map_symbol("com/example").unwrap(), "com/example");
        assert_eq!(&*remapper.map_package_name("com/example").unwrap(), "org/sample");
        assert_eq!(&*remapper.map_package_name("com/example/util").unwrap(), "org/sample/util");
        assert_eq!(&*remapper.map_package_name("com/other").unwrap(), "com/other");

        let unnamed = PackageRemapper::new("", "shaded");
        assert_eq!(&*unnamed.map_symbol("Main").unwrap(), "shaded/Main");
        assert_eq!(&*unnamed.map_symbol("java/lang/Object").unwrap(), "java/lang/Object");
        assert_eq!(&*unnamed.map_package_name("").unwrap(), "shaded");
        assert_eq!(&*unnamed.map_type(MODULE_INFO_NAME).unwrap(), "module-info");
    }

    #[test]
    fn package_remapper_into_the_unnamed_package() {
        let flatten = PackageRemapper::new("com/example", "");
        assert_eq!(&*flatten.map_type("com/example/Main").unwrap(), "Main");
        assert_eq!(&*flatten.map_type("com/example/util/Io").unwrap(), "util/Io");
        assert_eq!(&*flatten.map_descriptor("(Lcom/example/Main;)V").unwrap(), "(LMain;)V");
        assert_eq!(&*flatten.map_package_name("com/example").unwrap(), "");
        assert_eq!(&*flatten.map_package_name("com/example/util").unwrap(), "util");
    }

    struct Slashes;
    impl Remapper for Slashes {
        fn map_symbol(&self, name: &str) -> Result<Rc<str>> {
            Ok(Rc::from(match name {
                "a" => "/a",
                "b" => "b/",
                _ => "pkg//c"
            }))
        }
    }

    #[test]
    fn empty_package_segments_are_rejected() {
        for name in ["a", "b", "c"].iter() {
            assert!(matches!(Slashes.map_type(name), Err(RemapError::InvalidSymbol { .. })));
        }
        assert!(matches!(Identity.map_descriptor("L/a;"), Err(RemapError::InvalidDescriptor { .. })));
    }
}
