use shared::{Wine, WineCreate, WineListParams, WineListResponse, WineUpdate, WineUploadResult};
use uuid::Uuid;

use super::keys::{wine_key, wines_key};
use super::{SommelierClient, Target};
use crate::mutation::{Mutation, MutationKind};
use crate::query::{fetcher, Query};
use crate::upload::UploadFile;

impl SommelierClient {
    pub fn wines_target(&self, params: Option<WineListParams>) -> Target<WineListResponse> {
        let params = params?;
        let api = self.api.clone();
        let key = wines_key(&params);
        Some((
            key,
            fetcher(move || {
                let api = api.clone();
                let params = params.clone();
                async move { api.list_wines(&params).await }
            }),
        ))
    }

    pub fn wines(&self, params: Option<WineListParams>) -> Query<WineListResponse> {
        self.query(self.wines_target(params))
    }

    pub fn wine_target(&self, wine_id: Option<Uuid>) -> Target<Wine> {
        let wine_id = wine_id?;
        let api = self.api.clone();
        Some((
            wine_key(wine_id),
            fetcher(move || {
                let api = api.clone();
                async move { api.get_wine(wine_id).await }
            }),
        ))
    }

    pub fn wine(&self, wine_id: Option<Uuid>) -> Query<Wine> {
        self.query(self.wine_target(wine_id))
    }

    pub fn create_wine(&self) -> Mutation<WineCreate, Wine> {
        self.mutation(MutationKind::CreateWine, |api, wine: WineCreate| async move {
            api.create_wine(&wine).await
        })
    }

    /// Input is the wine id and the fields to change
    pub fn update_wine(&self) -> Mutation<(Uuid, WineUpdate), Wine> {
        self.mutation(
            MutationKind::UpdateWine,
            |api, (wine_id, update): (Uuid, WineUpdate)| async move {
                api.update_wine(wine_id, &update).await
            },
        )
        .with_subject(|(wine_id, _): &(Uuid, WineUpdate)| Some(*wine_id))
    }

    pub fn delete_wine(&self) -> Mutation<Uuid, ()> {
        self.mutation(MutationKind::DeleteWine, |api, wine_id: Uuid| async move {
            api.delete_wine(wine_id).await
        })
    }

    /// Input is the restaurant id and the CSV file
    pub fn bulk_upload_wines(&self) -> Mutation<(Uuid, UploadFile), WineUploadResult> {
        self.mutation(
            MutationKind::BulkUploadWines,
            |api, (restaurant_id, file): (Uuid, UploadFile)| async move {
                api.upload_wines(restaurant_id, file).await
            },
        )
    }
}
