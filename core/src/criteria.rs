use chrono::NaiveDate;
use docsearch_protocol::Category;
use docsearch_protocol::CriteriaQuery;
use docsearch_protocol::QUERY_DATE_FORMAT;
use docsearch_protocol::Tag;
use docsearch_protocol::TagLabel;

/// Ordered tags with no two labels equal ignoring case.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TagSet {
    tags: Vec<Tag>,
}

impl TagSet {
    /// Returns false (and changes nothing) when the label is already present.
    pub fn insert(&mut self, tag: Tag) -> bool {
        if self.contains_label(&tag.label) {
            return false;
        }
        self.tags.push(tag);
        true
    }

    pub fn remove(&mut self, index: usize) -> Option<Tag> {
        (index < self.tags.len()).then(|| self.tags.remove(index))
    }

    pub fn contains_label(&self, label: &str) -> bool {
        self.tags.iter().any(|tag| tag.same_label(label))
    }

    pub fn labels(&self) -> Vec<TagLabel> {
        self.tags
            .iter()
            .map(|tag| TagLabel {
                label: tag.label.clone(),
            })
            .collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Tag> {
        self.tags.iter()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

impl<'a> IntoIterator for &'a TagSet {
    type Item = &'a Tag;
    type IntoIter = std::slice::Iter<'a, Tag>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// The constraints the user has entered on the search screen.
///
/// Date ordering is deliberately not checked here; the date pickers own that.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterCriteria {
    category: Option<Category>,
    subcategory: Option<String>,
    date_from: Option<NaiveDate>,
    date_to: Option<NaiveDate>,
    tags: TagSet,
    free_text: String,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(&self) -> Option<Category> {
        self.category
    }

    pub fn subcategory(&self) -> Option<&str> {
        self.subcategory.as_deref()
    }

    pub fn date_from(&self) -> Option<NaiveDate> {
        self.date_from
    }

    pub fn date_to(&self) -> Option<NaiveDate> {
        self.date_to
    }

    pub fn tags(&self) -> &TagSet {
        &self.tags
    }

    pub fn free_text(&self) -> &str {
        &self.free_text
    }

    /// A subcategory only means something within its category, so it is
    /// dropped on every category change.
    pub fn set_category(&mut self, category: Option<Category>) {
        self.category = category;
        self.subcategory = None;
    }

    pub fn set_subcategory(&mut self, subcategory: Option<String>) {
        self.subcategory = subcategory;
    }

    pub fn set_date_from(&mut self, date: Option<NaiveDate>) {
        self.date_from = date;
    }

    pub fn set_date_to(&mut self, date: Option<NaiveDate>) {
        self.date_to = date;
    }

    pub fn add_tag(&mut self, label: &str) -> bool {
        self.tags.insert(Tag::new(label))
    }

    /// Same as [`Self::add_tag`] for a tag the service handed out.
    pub fn add_tag_with_id(&mut self, tag: Tag) -> bool {
        self.tags.insert(tag)
    }

    pub fn remove_tag(&mut self, index: usize) -> Option<Tag> {
        self.tags.remove(index)
    }

    pub fn set_free_text(&mut self, text: impl Into<String>) {
        self.free_text = text.into();
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Render the constraints the way the search endpoint expects them.
    pub fn to_query(&self) -> CriteriaQuery {
        CriteriaQuery {
            category: self
                .category
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
            subcategory: self.subcategory.clone().unwrap_or_default(),
            from_date: format_date(self.date_from),
            to_date: format_date(self.date_to),
            tags: self.tags.labels(),
        }
    }
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|date| date.format(QUERY_DATE_FORMAT).to_string())
        .unwrap_or_default()
}
