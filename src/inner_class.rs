//! Keeps `InnerClasses` entries consistent once their classes have been renamed.
use crate::error::Result;
use crate::remapper::Remapper;
use log::debug;
use std::rc::Rc;
#[cfg(feature = "tree")]
use crate::tree::InnerClassNode;

///The three names of an `InnerClasses` entry after remapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InnerClassNames {
    pub inner_name: Rc<str>,
    pub outer_name: Option<Rc<str>>,
    pub simple_name: Option<Rc<str>>
}

///Derives the simple name of a nested class from its remapped binary name.
///
///When `remapped_inner` is `remapped_outer$Rest`, the simple name is `Rest`. Otherwise the policy renamed the
///two classes inconsistently; the simple name then becomes whatever follows the last `$` (or `/`) of the remapped
///inner name, or stays `simple_name` if the inner class kept its name.
pub fn derive_simple_name(inner: &str, remapped_inner: &str, remapped_outer: &str, simple_name: &str) -> Rc<str> {
    if let Some(rest) = remapped_inner.strip_prefix(remapped_outer).and_then(|r| r.strip_prefix('$')) {
        if !rest.is_empty() {
            return Rc::from(rest);
        }
    }
    debug!("{} was renamed to {}, which is not nested in {}", inner, remapped_inner, remapped_outer);
    if inner == remapped_inner {
        return Rc::from(simple_name);
    }
    let tail = match remapped_inner.rfind(|c: char| c == '$' || c == '/') {
        Some(i) => &remapped_inner[i + 1..],
        None => remapped_inner
    };
    if tail.is_empty() {
        Rc::from(simple_name)
    } else {
        Rc::from(tail)
    }
}

pub fn derive_names<R>(remapper: &R, inner_name: &str, outer_name: Option<&str>, simple_name: Option<&str>) -> Result<InnerClassNames>
        where R: Remapper + ?Sized {
    let remapped_inner = remapper.map_type(inner_name)?;
    let outer_name = match outer_name {
        Some(outer) => outer,
        None => {
            return Ok(InnerClassNames {
                inner_name: remapped_inner,
                outer_name: None,
                simple_name: simple_name.map(Rc::from)
            });
        }
    };
    let remapped_outer = remapper.map_type(outer_name)?;
    let simple_name = simple_name.map(|simple| derive_simple_name(inner_name, &remapped_inner, &remapped_outer, simple));
    Ok(InnerClassNames {
        inner_name: remapped_inner,
        outer_name: Some(remapped_outer),
        simple_name
    })
}

///Remaps an `InnerClasses` entry. Access flags are carried over.
#[cfg(feature = "tree")]
pub fn derive_inner_class<R>(remapper: &R, node: &InnerClassNode) -> Result<InnerClassNode> where R: Remapper + ?Sized {
    let names = derive_names(remapper, &node.inner_name, node.outer_name.as_deref(), node.name.as_deref())?;
    Ok(InnerClassNode::new(node.access, names.inner_name, names.simple_name, names.outer_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SimpleRemapper;

    #[test]
    fn consistent_rename() {
        let remapper = SimpleRemapper::new()
            .with_class("a", "pkg/Demo")
            .with_class("a$g", "pkg/Demo$Container");
        let names = derive_names(&remapper, "a$g", Some("a"), Some("g")).unwrap();
        assert_eq!(&*names.inner_name, "pkg/Demo$Container");
        assert_eq!(names.outer_name.as_deref(), Some("pkg/Demo"));
        assert_eq!(names.simple_name.as_deref(), Some("Container"));
    }

    #[test]
    fn missing_outer_keeps_simple_name() {
        let remapper = SimpleRemapper::new().with_class("a$1Local", "pkg/Demo$1Helper");
        let names = derive_names(&remapper, "a$1Local", None, Some("Local")).unwrap();
        assert_eq!(&*names.inner_name, "pkg/Demo$1Helper");
        assert_eq!(names.outer_name, None);
        assert_eq!(names.simple_name.as_deref(), Some("Local"));

        let anonymous = derive_names(&remapper, "a$1Local", None, None).unwrap();
        assert_eq!(anonymous.simple_name, None);
    }

    #[test]
    fn inconsistent_rename_falls_back() {
        assert_eq!(&*derive_simple_name("a$g", "other/Box", "pkg/Demo", "g"), "Box");
        assert_eq!(&*derive_simple_name("a$g", "other/Holder$Box", "pkg/Demo", "g"), "Box");
        assert_eq!(&*derive_simple_name("a$g", "a$g", "pkg/Demo", "g"), "g");
        assert_eq!(&*derive_simple_name("a$g", "pkg/Demo$", "pkg/Demo", "g"), "g");
        assert_eq!(&*derive_simple_name("a$g", "Flat", "pkg/Demo", "g"), "Flat");
    }

    #[test]
    fn outer_name_is_a_prefix_but_not_an_enclosing_class() {
        assert_eq!(&*derive_simple_name("a$g", "pkg/DemoBox", "pkg/Demo", "g"), "DemoBox");
    }

    #[cfg(feature = "tree")]
    #[test]
    fn remaps_tree_entries() {
        use crate::InnerClassAccess;
        let remapper = SimpleRemapper::new()
            .with_class("a", "pkg/Demo")
            .with_class("a$g", "pkg/Demo$Container");
        let node = InnerClassNode::new(InnerClassAccess::ACC_PUBLIC | InnerClassAccess::ACC_STATIC,
            Rc::from("a$g"), Some(Rc::from("g")), Some(Rc::from("a")));
        let mapped = derive_inner_class(&remapper, &node).unwrap();
        assert_eq!(mapped, InnerClassNode::new(InnerClassAccess::ACC_PUBLIC | InnerClassAccess::ACC_STATIC,
            Rc::from("pkg/Demo$Container"), Some(Rc::from("Container")), Some(Rc::from("pkg/Demo"))));
    }
}
