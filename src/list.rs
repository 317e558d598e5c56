//! A sorted singly-linked list of unique keys.
//!
//! Every node is owned by the link in front of it (the head for the first
//! one), so insert and delete are just a matter of moving boxes between
//! links. There is no locking in here; wrap it in an [`RwLock`](crate::RwLock).

use std::fmt;

type Link = Option<Box<Node>>;

struct Node {
    key: u32,
    next: Link,
}

#[derive(Default)]
pub struct SortedList {
    head: Link,
    len: usize,
}

impl SortedList {
    pub const fn new() -> SortedList {
        SortedList { head: None, len: 0 }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Returns whether `key` is in the list.
    pub fn member(&self, key: u32) -> bool {
        let mut cur = self.head.as_deref();
        while let Some(node) = cur {
            if node.key >= key {
                return node.key == key;
            }
            cur = node.next.as_deref();
        }
        false
    }

    /// Inserts `key` in order. Returns `false` if it was already there.
    pub fn insert(&mut self, key: u32) -> bool {
        let link = self.link_for(key);
        if matches!(link, Some(node) if node.key == key) {
            return false;
        }
        let next = link.take();
        *link = Some(Box::new(Node { key, next }));
        self.len += 1;
        true
    }

    /// Removes `key`. Returns `false` if it wasn't there.
    pub fn delete(&mut self, key: u32) -> bool {
        let link = self.link_for(key);
        match link.take() {
            Some(node) if node.key == key => {
                *link = node.next;
                self.len -= 1;
                true
            }
            other => {
                *link = other;
                false
            }
        }
    }

    /// The first link whose node has a key `>= key`, or the empty tail.
    fn link_for(&mut self, key: u32) -> &mut Link {
        let mut link = &mut self.head;
        while matches!(link, Some(node) if node.key < key) {
            if let Some(node) = link {
                link = &mut node.next;
            }
        }
        link
    }

    /// Keys in ascending order.
    pub fn iter(&self) -> Iter<'_> {
        Iter { next: self.head.as_deref() }
    }

    pub fn is_strictly_increasing(&self) -> bool {
        let mut keys = self.iter();
        let Some(mut prev) = keys.next() else {
            return true;
        };
        for key in keys {
            if key <= prev {
                return false;
            }
            prev = key;
        }
        true
    }
}

impl Drop for SortedList {
    fn drop(&mut self) {
        // unlink one box at a time, the default drop would recurse per node
        let mut cur = self.head.take();
        while let Some(mut node) = cur {
            cur = node.next.take();
        }
    }
}

impl fmt::Debug for SortedList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// Space-separated keys, the way the benchmark prints the list.
impl fmt::Display for SortedList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, key) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", key)?;
        }
        Ok(())
    }
}

pub struct Iter<'a> {
    next: Option<&'a Node>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        let node = self.next?;
        self.next = node.next.as_deref();
        Some(node.key)
    }
}

impl<'a> IntoIterator for &'a SortedList {
    type Item = u32;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

impl FromIterator<u32> for SortedList {
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> SortedList {
        let mut list = SortedList::new();
        for key in iter {
            list.insert(key);
        }
        list
    }
}
