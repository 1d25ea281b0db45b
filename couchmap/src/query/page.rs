use crate::errors::{CouchmapError, CouchmapResult, ErrorKind};

/// Zero-based page number plus page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageRequest {
    page: usize,
    size: usize,
}

impl PageRequest {
    pub fn new(page: usize, size: usize) -> CouchmapResult<Self> {
        if size == 0 {
            log::error!("Page size must be positive");
            return Err(CouchmapError::new(
                "Page size must be greater than zero",
                ErrorKind::InvalidOperation,
            ));
        }
        // the offset and the extra row fetched for slices must be addressable
        if page.checked_mul(size).is_none() || size.checked_add(1).is_none() {
            log::error!("Page {} of size {} is out of range", page, size);
            return Err(CouchmapError::new(
                &format!("Page {} of size {} exceeds the addressable row range", page, size),
                ErrorKind::InvalidOperation,
            ));
        }
        Ok(PageRequest { page, size })
    }

    /// First page with the given size.
    pub fn of_size(size: usize) -> CouchmapResult<Self> {
        PageRequest::new(0, size)
    }

    pub fn page_number(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.size
    }

    /// Number of rows to skip before this page.
    pub fn offset(&self) -> usize {
        self.page * self.size
    }

    /// The following page, if its offset is still addressable.
    pub fn next(&self) -> CouchmapResult<PageRequest> {
        match self.page.checked_add(1) {
            Some(page) => PageRequest::new(page, self.size),
            None => {
                log::error!("Page {} has no successor", self.page);
                Err(CouchmapError::new(
                    "Page number exceeds the addressable range",
                    ErrorKind::InvalidOperation,
                ))
            }
        }
    }

    pub fn previous_or_first(&self) -> PageRequest {
        PageRequest {
            page: self.page.saturating_sub(1),
            size: self.size,
        }
    }

    pub fn has_previous(&self) -> bool {
        self.page > 0
    }
}

/// A page of results together with the total number of matching rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    content: Vec<T>,
    request: PageRequest,
    total: u64,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: PageRequest, total: u64) -> Self {
        Page { content, request, total }
    }

    pub fn content(&self) -> &[T] {
        &self.content
    }

    pub fn into_content(self) -> Vec<T> {
        self.content
    }

    pub fn request(&self) -> PageRequest {
        self.request
    }

    pub fn total_elements(&self) -> u64 {
        self.total
    }

    pub fn total_pages(&self) -> u64 {
        self.total.div_ceil(self.request.size as u64)
    }

    pub fn number_of_elements(&self) -> usize {
        self.content.len()
    }

    pub fn has_next(&self) -> bool {
        (self.request.page as u64) < self.total_pages().saturating_sub(1)
    }

    pub fn has_previous(&self) -> bool {
        self.request.has_previous()
    }

    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            request: self.request,
            total: self.total,
        }
    }
}

/// A page of results that only knows whether more rows follow.
#[derive(Debug, Clone, PartialEq)]
pub struct Slice<T> {
    content: Vec<T>,
    request: PageRequest,
    has_next: bool,
}

impl<T> Slice<T> {
    pub fn new(content: Vec<T>, request: PageRequest, has_next: bool) -> Self {
        Slice {
            content,
            request,
            has_next,
        }
    }

    pub fn content(&self) -> &[T] {
        &self.content
    }

    pub fn into_content(self) -> Vec<T> {
        self.content
    }

    pub fn request(&self) -> PageRequest {
        self.request
    }

    pub fn has_next(&self) -> bool {
        self.has_next
    }

    pub fn has_previous(&self) -> bool {
        self.request.has_previous()
    }

    /// `None` on the last slice or when the next page cannot be addressed.
    pub fn next_request(&self) -> Option<PageRequest> {
        if self.has_next {
            self.request.next().ok()
        } else {
            None
        }
    }
}
