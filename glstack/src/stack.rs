//! Binding stacks.
//!
//! A [`BindingStack`] shadows one piece of driver state. Its top is the value the driver is known to
//! hold; the frames below it are the values to restore when nested scopes end. An empty stack means
//! the value is unknown and must be queried from the driver before use.

/// Outcome of [`BindingStack::pop`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Popped<T> {
  /// The new top equals the removed value: the driver already holds it.
  Unchanged,
  /// The new top differs from the removed value and must be restored natively.
  Restore(T),
  /// The last frame was removed: the driver keeps the removed value and the stack is unknown again.
  Exhausted,
  /// The stack was already empty.
  Underflow,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BindingStack<T> {
  frames: Vec<T>,
}

impl<T> Default for BindingStack<T> {
  fn default() -> Self {
    BindingStack { frames: Vec::new() }
  }
}

impl<T> BindingStack<T>
where
  T: Clone + PartialEq,
{
  pub fn new() -> Self {
    Self::default()
  }

  /// Stack seeded with a single known value.
  pub fn with_value(value: T) -> Self {
    BindingStack {
      frames: vec![value],
    }
  }

  pub fn top(&self) -> Option<&T> {
    self.frames.last()
  }

  pub fn depth(&self) -> usize {
    self.frames.len()
  }

  pub fn is_empty(&self) -> bool {
    self.frames.is_empty()
  }

  /// Bottom-to-top view of the frames.
  pub fn frames(&self) -> &[T] {
    &self.frames
  }

  /// Overwrite the top (or seed an empty stack) with `value`.
  ///
  /// Returns `true` if the driver must be told: the stack was empty or its top differed.
  pub fn set(&mut self, value: T) -> bool {
    match self.frames.last_mut() {
      Some(top) if *top == value => false,

      Some(top) => {
        *top = value;
        true
      }

      None => {
        self.frames.push(value);
        true
      }
    }
  }

  /// Push `value` as a new frame.
  ///
  /// Returns `true` if the driver must be told: the stack was empty or the previous top differed.
  pub fn push(&mut self, value: T) -> bool {
    let changed = self.frames.last().map_or(true, |top| *top != value);
    self.frames.push(value);
    changed
  }

  /// Duplicate the current top; nothing to tell the driver. Does nothing on an empty stack.
  pub fn push_top(&mut self) {
    if let Some(top) = self.frames.last().cloned() {
      self.frames.push(top);
    }
  }

  /// Remove the top frame.
  pub fn pop(&mut self) -> Popped<T> {
    let removed = match self.frames.pop() {
      Some(removed) => removed,
      None => return Popped::Underflow,
    };

    match self.frames.last() {
      Some(top) if *top == removed => Popped::Unchanged,
      Some(top) => Popped::Restore(top.clone()),
      None => Popped::Exhausted,
    }
  }

  /// Current value, querying the driver if unknown.
  ///
  /// A queried value is pushed twice: the bottom frame records the driver's original state so a
  /// later pop of the first explicitly pushed frame still has something to restore.
  pub fn get_or_query(&mut self, query: impl FnOnce() -> T) -> T {
    if let Some(top) = self.frames.last() {
      return top.clone();
    }

    let value = query();
    self.frames.push(value.clone());
    self.frames.push(value.clone());
    value
  }
}
