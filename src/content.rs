//! Storage for the content an object may hold.
//!
//! A concrete type embeds the storage it needs and exposes it through the
//! matching [`XmlObject`](crate::XmlObject) accessor. A type exposing
//! neither [`SimpleText`] nor [`ComplexContent`] is childless and holds no
//! text.

use crate::error::Error;
use crate::object::ObjectId;

/// Children of a childless object: always empty, shared by all of them.
pub(crate) const NO_CHILDREN: &[Option<ObjectId>] = &[];

fn is_all_whitespace(s: &str) -> bool {
    s.chars().all(char::is_whitespace)
}

/// A single text value, for elements with simple content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimpleText {
    value: Option<String>,
}

impl SimpleText {
    pub fn new() -> Self {
        Self::default()
    }

    /// The text. Only position 0 exists.
    pub fn text(&self, position: usize) -> Option<&str> {
        if position == 0 {
            self.value.as_deref()
        } else {
            None
        }
    }

    /// Whether storing `value` at `position` would change the stored text.
    ///
    /// A value replaces the stored one when it clears it, when nothing is
    /// stored, or when what is stored is only whitespace. Text that is
    /// already present is not clobbered by a later non-empty value.
    pub fn would_change(&self, value: Option<&str>, position: usize) -> Result<bool, Error> {
        if position > 0 {
            return Err(Error::StructuralViolation(
                "cannot set text at a position greater than 0 in simple content".into(),
            ));
        }
        let replaces = match (&self.value, value) {
            (_, None) => true,
            (None, Some(_)) => true,
            (Some(current), Some(_)) => is_all_whitespace(current),
        };
        Ok(replaces && self.value.as_deref() != value)
    }

    /// Store text following the overwrite policy of [`SimpleText::would_change`].
    pub fn set_text(&mut self, value: Option<&str>, position: usize) -> Result<(), Error> {
        if self.would_change(value, position)? {
            self.value = value.map(str::to_string);
        }
        Ok(())
    }
}

/// Ordered child slots with interleaved text, for complex (mixed) content.
///
/// The first `reserved` slots are named: a type addresses them by index and
/// they keep their position when emptied. Further slots hold generic
/// children. Text at position `n` precedes the `n`th child and follows the
/// one before it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComplexContent {
    slots: Vec<Option<ObjectId>>,
    reserved: usize,
    text: Vec<Option<String>>,
}

impl ComplexContent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Content with `reserved` named slots, all empty.
    pub fn with_named_slots(reserved: usize) -> Self {
        Self {
            slots: vec![None; reserved],
            reserved,
            text: Vec::new(),
        }
    }

    /// All slots in order, including empty named ones.
    pub fn slots(&self) -> &[Option<ObjectId>] {
        &self.slots
    }

    pub fn slot(&self, index: usize) -> Option<ObjectId> {
        self.slots.get(index).copied().flatten()
    }

    /// Children in order, skipping empty slots.
    pub fn children(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.slots.iter().flatten().copied()
    }

    pub fn has_children(&self) -> bool {
        self.slots.iter().any(Option::is_some)
    }

    pub fn contains(&self, child: ObjectId) -> bool {
        self.slots.contains(&Some(child))
    }

    /// Put a child into a slot and return what was there.
    ///
    /// Slots past the end are created empty as needed. Filling or emptying
    /// a slot moves the text positions after it like an insert or a
    /// removal would.
    pub fn set_slot(&mut self, index: usize, child: Option<ObjectId>) -> Option<ObjectId> {
        if index >= self.slots.len() {
            self.slots.resize(index + 1, None);
        }
        let position = self.position_of(index);
        let previous = std::mem::replace(&mut self.slots[index], child);
        match (previous.is_some(), child.is_some()) {
            (false, true) => self.split_text(position),
            (true, false) => self.join_text(position),
            _ => {}
        }
        previous
    }

    /// Append a generic child and return its slot index.
    pub fn push(&mut self, child: ObjectId) -> usize {
        let position = self.children().count();
        self.slots.push(Some(child));
        self.split_text(position);
        self.slots.len() - 1
    }

    /// Insert a generic child before the slot at `index`.
    ///
    /// Named slots cannot be shifted, so the index is clamped past them.
    /// Text before the insertion point stays before the new child.
    pub fn insert(&mut self, index: usize, child: ObjectId) -> usize {
        let index = index.clamp(self.reserved, self.slots.len());
        let position = self.position_of(index);
        self.slots.insert(index, Some(child));
        self.split_text(position);
        index
    }

    /// Remove every occurrence of a child. Named slots are emptied, generic
    /// slots are dropped. The text on either side of a removed child is
    /// joined.
    pub fn remove_child(&mut self, child: ObjectId) -> bool {
        let mut removed = false;
        let mut index = 0;
        while index < self.slots.len() {
            if self.slots[index] != Some(child) {
                index += 1;
                continue;
            }
            let position = self.position_of(index);
            if index < self.reserved {
                self.slots[index] = None;
                index += 1;
            } else {
                self.slots.remove(index);
            }
            self.join_text(position);
            removed = true;
        }
        removed
    }

    /// The text position of the child in slot `index`.
    fn position_of(&self, index: usize) -> usize {
        self.slots[..index].iter().flatten().count()
    }

    /// A child arrived at `position`: the text after it starts out empty.
    fn split_text(&mut self, position: usize) {
        if position < self.text.len() {
            self.text.insert(position + 1, None);
        }
    }

    /// The child at `position` left: the text after it joins the text
    /// before it.
    fn join_text(&mut self, position: usize) {
        if position + 1 >= self.text.len() {
            return;
        }
        let after = self.text.remove(position + 1);
        let before = self.text[position].take();
        self.text[position] = match (before, after) {
            (Some(before), Some(after)) => Some(before + &after),
            (before, after) => before.or(after),
        };
    }

    pub fn text(&self, position: usize) -> Option<&str> {
        self.text.get(position).and_then(|text| text.as_deref())
    }

    /// Whether storing `value` at `position` would change anything.
    ///
    /// Positions count present children, so empty named slots take none.
    pub fn would_change(&self, value: Option<&str>, position: usize) -> Result<bool, Error> {
        let count = self.children().count();
        if position > count {
            return Err(Error::StructuralViolation(format!(
                "cannot set text at position {} with only {} children",
                position, count
            )));
        }
        Ok(self.text(position) != value)
    }

    /// Store text at a position, padding earlier positions with no text.
    pub fn set_text(&mut self, value: Option<&str>, position: usize) -> Result<(), Error> {
        if !self.would_change(value, position)? {
            return Ok(());
        }
        if position >= self.text.len() {
            self.text.resize(position + 1, None);
        }
        self.text[position] = value.map(str::to_string);
        Ok(())
    }

    pub(crate) fn remap_children(&mut self, mut map: impl FnMut(ObjectId) -> ObjectId) {
        for slot in self.slots.iter_mut().flatten() {
            *slot = map(*slot);
        }
    }
}

/// XML the engine does not model, kept as a string while no DOM holds it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForeignContent {
    pub(crate) xml: Option<String>,
}

impl ForeignContent {
    pub fn new() -> Self {
        Self::default()
    }

    /// The preserved serialization, if the content is not currently held
    /// by a cached DOM.
    pub fn xml(&self) -> Option<&str> {
        self.xml.as_deref()
    }
}
