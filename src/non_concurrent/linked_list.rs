use std::fmt;
use std::io::{self, Write};
use std::iter::FusedIterator;
use std::marker::PhantomData;
use std::ptr::NonNull;

use log::{debug, trace, warn};

/// What [`SinglyLinkedList::print`] shows for a list with no nodes.
pub const EMPTY_LIST: &str = "(empty)";

type Link<T> = Option<NonNull<Node<T>>>;

/// A single element of a [`SinglyLinkedList`]: one value and a link to the
/// node after it.
pub struct Node<T> {
    value: T,
    next: Link<T>,
}

impl<T> Node<T> {
    /// Allocates a detached node. Ownership of the allocation passes to the
    /// list that links it in, which frees it with `Box::from_raw`.
    fn alloc(value: T) -> NonNull<Self> {
        NonNull::from(Box::leak(Box::new(Self { value, next: None })))
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    /// The successor of this node, `None` for the tail.
    pub fn next(&self) -> Option<&Node<T>> {
        // SAFETY: a linked successor stays allocated as long as the list it
        //         belongs to, and the list can't be mutated while `self` is
        //         borrowed out of it.
        self.next.map(|next| unsafe { next.as_ref() })
    }

    pub fn is_last(&self) -> bool {
        self.next.is_none()
    }
}

impl<T> std::ops::Deref for Node<T> {
    type Target = T;
    fn deref(&self) -> &Self::Target {
        &self.value
    }
}

impl<T: fmt::Debug> fmt::Debug for Node<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("value", &self.value)
            .field("is_last", &self.is_last())
            .finish()
    }
}

/// Singly linked list with O(1) append.
///
/// Nodes are separate heap allocations joined by raw links. The list owns
/// every one of them: `head` is the first, `tail` the last, and each node is
/// reachable from `head` exactly once. All pointers into the chain come
/// straight from the allocation, never from a reference, so walking or
/// mutating one node never invalidates another link to it.
pub struct SinglyLinkedList<T> {
    head: Link<T>,
    tail: Link<T>,
    len: usize,
    _owns: PhantomData<Box<Node<T>>>,
}

// SAFETY: the list is the only owner of its nodes; no link to them is ever
//         handed out except as a reference bounded by a borrow of the list.
//         Sending the list sends its `T`s and nothing else.
unsafe impl<T: Send> Send for SinglyLinkedList<T> {}
// SAFETY: through `&SinglyLinkedList` nodes are only read, and only as
//         `&T`/`&Node<T>`; every write to a link needs `&mut self`.
unsafe impl<T: Sync> Sync for SinglyLinkedList<T> {}

impl<T> SinglyLinkedList<T> {
    pub const fn new() -> Self {
        Self {
            head: None,
            tail: None,
            len: 0,
            _owns: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    pub fn head(&self) -> Option<&Node<T>> {
        // SAFETY: `head` is a live node owned by `self`; shared access only.
        self.head.map(|head| unsafe { head.as_ref() })
    }

    pub fn tail(&self) -> Option<&Node<T>> {
        // SAFETY: `tail` is a live node owned by `self`; shared access only.
        self.tail.map(|tail| unsafe { tail.as_ref() })
    }

    pub fn first(&self) -> Option<&T> {
        self.head().map(Node::value)
    }

    pub fn last(&self) -> Option<&T> {
        self.tail().map(Node::value)
    }

    /// Appends `value` as the new tail.
    ///
    /// Complexity: O(1)
    pub fn add(&mut self, value: T) {
        let node = Node::alloc(value);
        match self.tail {
            None => self.head = Some(node),
            // SAFETY: `tail` is a live node owned by `self`, and with
            //         `&mut self` no reference into the chain is alive.
            Some(tail) => unsafe { (*tail.as_ptr()).next = Some(node) },
        }
        self.tail = Some(node);
        self.len += 1;

        trace!("added node #{}", self.len);
    }

    /// Removes the first node (head to tail) holding a value equal to `value`.
    ///
    /// Returns whether a node was removed. Later duplicates are left alone.
    ///
    /// Complexity: O(n)
    pub fn remove(&mut self, value: &T) -> bool
    where
        T: PartialEq,
    {
        let mut prev: Link<T> = None;
        let mut current = self.head;
        let mut position = 0;

        let matched = loop {
            let Some(node) = current else {
                debug!("remove: no match among {} nodes", self.len);
                return false;
            };
            // SAFETY: every link reachable from `head` is a live node owned by `self`.
            let node_ref = unsafe { node.as_ref() };
            if node_ref.value == *value {
                break node;
            }
            prev = current;
            current = node_ref.next;
            position += 1;
        };

        // SAFETY: `matched` came from `Node::alloc` and is unlinked below
        //         before anything can reach it again, so this is its last owner.
        let removed = unsafe { Box::from_raw(matched.as_ptr()) };
        match prev {
            None => self.head = removed.next,
            // SAFETY: `prev` is a live node owned by `self`, distinct from `matched`.
            Some(prev) => unsafe { (*prev.as_ptr()).next = removed.next },
        }
        // `prev` is `None` exactly when the head was removed, so an emptied
        // list also ends up with no tail.
        if removed.next.is_none() {
            self.tail = prev;
        }
        self.len -= 1;
        drop(removed);

        trace!("removed node at position {position} ({} left)", self.len);
        true
    }

    /// Returns the first node (head to tail) holding a value equal to `value`.
    ///
    /// Complexity: O(n)
    pub fn find(&self, value: &T) -> Option<&Node<T>>
    where
        T: PartialEq,
    {
        self.nodes().find(|node| node.value == *value)
    }

    /// Like [`find`](Self::find), but gives mutable access to the value.
    /// The links of the node stay out of reach.
    pub fn find_mut(&mut self, value: &T) -> Option<&mut T>
    where
        T: PartialEq,
    {
        self.iter_mut().find(|candidate| **candidate == *value)
    }

    pub fn contains(&self, value: &T) -> bool
    where
        T: PartialEq,
    {
        self.find(value).is_some()
    }

    /// Drops every node, leaving the list empty.
    pub fn clear(&mut self) {
        let released = self.release_all();
        debug!("cleared {released} nodes");
    }

    /// Writes every value, head to tail, to stdout.
    ///
    /// The format is the one of the `Display` impl. I/O errors are logged
    /// rather than returned.
    pub fn print(&self)
    where
        T: fmt::Display,
    {
        let stdout = io::stdout();
        if let Err(e) = self.print_to(&mut stdout.lock()) {
            warn!("failed to print list: {e}");
        }
    }

    pub fn print_to<W: Write + ?Sized>(&self, sink: &mut W) -> io::Result<()>
    where
        T: fmt::Display,
    {
        writeln!(sink, "{self}")
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            next: self.head(),
            remaining: self.len,
        }
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        IterMut {
            next: self.head,
            remaining: self.len,
            _list: PhantomData,
        }
    }

    fn nodes(&self) -> impl Iterator<Item = &Node<T>> {
        std::iter::successors(self.head(), |node| node.next())
    }

    fn pop_head(&mut self) -> Option<T> {
        let head = self.head?;
        // SAFETY: `head` came from `Node::alloc` and is unlinked right away.
        let node = unsafe { Box::from_raw(head.as_ptr()) };
        let Node { value, next } = *node;
        self.head = next;
        if self.head.is_none() {
            self.tail = None;
        }
        self.len -= 1;
        Some(value)
    }

    fn release_all(&mut self) -> usize {
        let released = self.len;
        self.tail = None;
        self.len = 0;

        let mut link = self.head.take();
        while let Some(node) = link {
            // SAFETY: every node is reachable from `head` exactly once, and
            //         the chain was detached from `self` above.
            let node = unsafe { Box::from_raw(node.as_ptr()) };
            link = node.next;
        }
        released
    }
}

impl<T> Drop for SinglyLinkedList<T> {
    fn drop(&mut self) {
        let released = self.release_all();
        if released > 0 {
            trace!("dropped list of {released} nodes");
        }
    }
}

impl<T> Default for SinglyLinkedList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for SinglyLinkedList<T> {
    fn clone(&self) -> Self {
        self.iter().cloned().collect()
    }
}

impl<T: PartialEq> PartialEq for SinglyLinkedList<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for SinglyLinkedList<T> {}

impl<T: fmt::Debug> fmt::Debug for SinglyLinkedList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// `1, 2, 3`, or [`EMPTY_LIST`] when there is nothing to show.
impl<T: fmt::Display> fmt::Display for SinglyLinkedList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str(EMPTY_LIST);
        }
        for (i, value) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            fmt::Display::fmt(value, f)?;
        }
        Ok(())
    }
}

impl<T> FromIterator<T> for SinglyLinkedList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = Self::new();
        list.extend(iter);
        list
    }
}

impl<T> Extend<T> for SinglyLinkedList<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.add(value);
        }
    }
}

pub struct Iter<'a, T> {
    next: Option<&'a Node<T>>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.next?;
        self.next = node.next();
        self.remaining -= 1;
        Some(&node.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
impl<T> FusedIterator for Iter<'_, T> {}

pub struct IterMut<'a, T> {
    next: Link<T>,
    remaining: usize,
    _list: PhantomData<&'a mut SinglyLinkedList<T>>,
}

impl<'a, T> Iterator for IterMut<'a, T> {
    type Item = &'a mut T;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.next?;
        // SAFETY: the list stays mutably borrowed for `'a`, and each node is
        //         visited once, so the `&mut T` handed out is unique. Only the
        //         `value` field is borrowed; links are read through the raw
        //         pointer.
        unsafe {
            self.next = (*node.as_ptr()).next;
            self.remaining -= 1;
            Some(&mut (*node.as_ptr()).value)
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for IterMut<'_, T> {}
impl<T> FusedIterator for IterMut<'_, T> {}

pub struct IntoIter<T>(SinglyLinkedList<T>);

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.pop_head()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.0.len, Some(self.0.len))
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}
impl<T> FusedIterator for IntoIter<T> {}

impl<T> IntoIterator for SinglyLinkedList<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter(self)
    }
}

impl<'a, T> IntoIterator for &'a SinglyLinkedList<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut SinglyLinkedList<T> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}
