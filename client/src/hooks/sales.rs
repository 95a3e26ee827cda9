use shared::{Sale, SaleCreate, SaleListParams, SaleListResponse, SaleUploadResult};
use uuid::Uuid;

use super::keys::{sale_key, sales_key};
use super::{SommelierClient, Target};
use crate::mutation::{Mutation, MutationKind};
use crate::query::{fetcher, Query};
use crate::upload::UploadFile;

impl SommelierClient {
    pub fn sales_target(&self, params: Option<SaleListParams>) -> Target<SaleListResponse> {
        let params = params?;
        let api = self.api.clone();
        let key = sales_key(&params);
        Some((
            key,
            fetcher(move || {
                let api = api.clone();
                let params = params.clone();
                async move { api.list_sales(&params).await }
            }),
        ))
    }

    pub fn sales(&self, params: Option<SaleListParams>) -> Query<SaleListResponse> {
        self.query(self.sales_target(params))
    }

    pub fn sale_target(&self, sale_id: Option<Uuid>) -> Target<Sale> {
        let sale_id = sale_id?;
        let api = self.api.clone();
        Some((
            sale_key(sale_id),
            fetcher(move || {
                let api = api.clone();
                async move { api.get_sale(sale_id).await }
            }),
        ))
    }

    pub fn sale(&self, sale_id: Option<Uuid>) -> Query<Sale> {
        self.query(self.sale_target(sale_id))
    }

    pub fn create_sale(&self) -> Mutation<SaleCreate, Sale> {
        self.mutation(MutationKind::CreateSale, |api, sale: SaleCreate| async move {
            api.create_sale(&sale).await
        })
    }

    pub fn delete_sale(&self) -> Mutation<Uuid, ()> {
        self.mutation(MutationKind::DeleteSale, |api, sale_id: Uuid| async move {
            api.delete_sale(sale_id).await
        })
    }

    /// Input is the restaurant id and the CSV file
    pub fn bulk_upload_sales(&self) -> Mutation<(Uuid, UploadFile), SaleUploadResult> {
        self.mutation(
            MutationKind::BulkUploadSales,
            |api, (restaurant_id, file): (Uuid, UploadFile)| async move {
                api.upload_sales(restaurant_id, file).await
            },
        )
    }
}
