use std::slice::Chunks;

/// Fixed-size pages over an already ranked slice. The last page may be
/// shorter. Iterating again starts over from the first page.
#[derive(Debug, Clone, Copy)]
pub struct Paginator<'a, T> {
    items: &'a [T],
    page_size: usize,
}

impl<'a, T> Paginator<'a, T> {
    /// A `page_size` of 0 is treated as 1.
    pub fn new(items: &'a [T], page_size: usize) -> Self {
        Self { items, page_size: page_size.max(1) }
    }

    pub fn iter(&self) -> Chunks<'a, T> {
        self.items.chunks(self.page_size)
    }

    /// Number of pages.
    pub fn len(&self) -> usize {
        self.items.len().div_ceil(self.page_size)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }
}

impl<'a, T> IntoIterator for &Paginator<'a, T> {
    type Item = &'a [T];
    type IntoIter = Chunks<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T> IntoIterator for Paginator<'a, T> {
    type Item = &'a [T];
    type IntoIter = Chunks<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub fn paginate<T>(items: &[T], page_size: usize) -> Paginator<'_, T> {
    Paginator::new(items, page_size)
}
