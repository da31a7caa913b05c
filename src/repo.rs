use crate::models::Template;
use crate::system::StoreError;

/// Persistence seam for the template collection. The repository serializes
/// the whole collection on every mutation; partial writes do not exist.
pub(crate) trait TemplateStore {
    fn load(&self) -> Result<Vec<Template>, StoreError>;
    fn save(&self, templates: &[Template]) -> Result<(), StoreError>;
}

pub(crate) struct TemplateRepository {
    store: Box<dyn TemplateStore>,
    templates: Vec<Template>,
}

impl TemplateRepository {
    pub(crate) fn open(store: Box<dyn TemplateStore>) -> Result<Self, StoreError> {
        let templates = store.load()?;
        Ok(Self { store, templates })
    }

    pub(crate) fn list(&self) -> &[Template] {
        &self.templates
    }

    pub(crate) fn get_by_id(&self, id: &str) -> Option<&Template> {
        self.templates.iter().find(|template| template.id == id)
    }

    pub(crate) fn upsert(&mut self, template: Template) -> Result<&Template, StoreError> {
        let index = match self
            .templates
            .iter()
            .position(|existing| existing.id == template.id)
        {
            Some(index) => {
                self.templates[index] = template;
                index
            }
            None => {
                self.templates.push(template);
                self.templates.len() - 1
            }
        };
        self.store.save(&self.templates)?;
        Ok(&self.templates[index])
    }

    pub(crate) fn delete(&mut self, id: &str) -> Result<(), StoreError> {
        self.templates.retain(|template| template.id != id);
        self.store.save(&self.templates)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    /// In-memory stand-in for the JSON file store.
    #[derive(Clone, Default)]
    pub(crate) struct MemoryStore {
        pub(crate) saved: Rc<RefCell<Vec<Template>>>,
    }

    impl MemoryStore {
        pub(crate) fn with(templates: Vec<Template>) -> Self {
            Self {
                saved: Rc::new(RefCell::new(templates)),
            }
        }
    }

    impl TemplateStore for MemoryStore {
        fn load(&self) -> Result<Vec<Template>, StoreError> {
            Ok(self.saved.borrow().clone())
        }

        fn save(&self, templates: &[Template]) -> Result<(), StoreError> {
            *self.saved.borrow_mut() = templates.to_vec();
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::MemoryStore;
    use super::*;

    fn template(id: &str, name: &str) -> Template {
        let mut template = Template::new(id.to_string());
        template.name = name.to_string();
        template
    }

    #[test]
    fn open_loads_existing_collection() {
        let store = MemoryStore::with(vec![template("1", "one"), template("2", "two")]);
        let repo = TemplateRepository::open(Box::new(store)).unwrap();
        assert_eq!(repo.list().len(), 2);
        assert_eq!(repo.get_by_id("2").unwrap().name, "two");
    }

    #[test]
    fn get_by_id_unknown_returns_none() {
        let repo = TemplateRepository::open(Box::new(MemoryStore::default())).unwrap();
        assert!(repo.get_by_id("missing").is_none());
    }

    #[test]
    fn upsert_new_id_appends() {
        let store = MemoryStore::with(vec![template("1", "one")]);
        let mut repo = TemplateRepository::open(Box::new(store)).unwrap();

        repo.upsert(template("2", "two")).unwrap();
        let ids: Vec<&str> = repo.list().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[test]
    fn upsert_existing_id_replaces_in_place() {
        let store = MemoryStore::with(vec![
            template("1", "one"),
            template("2", "two"),
            template("3", "three"),
        ]);
        let mut repo = TemplateRepository::open(Box::new(store)).unwrap();

        repo.upsert(template("2", "renamed")).unwrap();
        assert_eq!(repo.list().len(), 3);
        assert_eq!(repo.list()[1].id, "2");
        assert_eq!(repo.list()[1].name, "renamed");
    }

    #[test]
    fn mutations_persist_whole_collection() {
        let store = MemoryStore::default();
        let saved = store.saved.clone();
        let mut repo = TemplateRepository::open(Box::new(store)).unwrap();

        repo.upsert(template("1", "one")).unwrap();
        repo.upsert(template("2", "two")).unwrap();
        assert_eq!(saved.borrow().len(), 2);

        repo.delete("1").unwrap();
        assert_eq!(saved.borrow().len(), 1);
        assert_eq!(saved.borrow()[0].id, "2");
    }

    #[test]
    fn delete_unknown_id_leaves_collection_intact() {
        let store = MemoryStore::with(vec![template("1", "one")]);
        let mut repo = TemplateRepository::open(Box::new(store)).unwrap();

        repo.delete("missing").unwrap();
        assert_eq!(repo.list().len(), 1);
    }
}
